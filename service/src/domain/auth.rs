use folio_common::Email;

use crate::domain::{
    DomainError,
    repository::{SessionRepository, UserRepository},
    security,
    users::User,
};

/// Checks the credentials and opens a session.
///
/// Unknown emails and wrong passwords fail the same way.
pub async fn login<R>(repository: &R, email: &str, password: &str) -> Result<(User, String), DomainError>
where
    R: UserRepository + SessionRepository,
{
    let email = Email::try_new(email).map_err(|_| DomainError::InvalidCredentials)?;

    let user = repository
        .find_user_by_email(&email)
        .await?
        .filter(|user| security::verify_password(&user.password_hash, password))
        .ok_or(DomainError::InvalidCredentials)?;

    let token = security::random_token();
    repository.create_session(&token, user.id).await?;
    tracing::info!(user_id = %user.id, "logged in");
    Ok((user, token))
}

pub async fn logout(repository: &impl SessionRepository, token: &str) -> Result<(), DomainError> {
    repository.delete_session(token).await?;
    Ok(())
}

/// The user owning the session `token`, if any.
pub async fn session_user<R>(repository: &R, token: &str) -> Result<Option<User>, DomainError>
where
    R: UserRepository + SessionRepository,
{
    match repository.find_session_user(token).await? {
        Some(user_id) => Ok(repository.find_user(user_id).await?),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::{CreateUser, create_user};
    use crate::infrastructure::memory::MemoryRepository;

    async fn registered(repository: &MemoryRepository) -> User {
        create_user(
            repository,
            CreateUser {
                name: None,
                email: "author@example.org".to_string(),
                username: "author".to_string(),
                password: "password123".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn login_opens_a_session() {
        let repository = MemoryRepository::default();
        let user = registered(&repository).await;

        let (logged_in, token) = login(&repository, "Author@example.org", "password123")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let resolved = session_user(&repository, &token).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));

        logout(&repository, &token).await.unwrap();
        assert!(session_user(&repository, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let repository = MemoryRepository::default();
        registered(&repository).await;

        let wrong_password = login(&repository, "author@example.org", "password124").await;
        let unknown_email = login(&repository, "nobody@example.org", "password123").await;
        let malformed = login(&repository, "nobody", "password123").await;

        assert!(matches!(wrong_password, Err(DomainError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(DomainError::InvalidCredentials)));
        assert!(matches!(malformed, Err(DomainError::InvalidCredentials)));
    }
}

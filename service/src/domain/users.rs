use chrono::{DateTime, Duration, Utc};
use folio_common::{Email, Role, UserId, Username};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    DomainError, VerificationSettings,
    repository::{RepositoryError, UserRepository},
    security,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_metadata: Value,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub staged: bool,
    /// Global role names
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name if it is set, username otherwise.
    pub fn display_label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_application_admin(&self) -> bool {
        self.has_role(Role::ApplicationAdministrator.name())
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub staged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub profile_metadata: Option<Value>,
}

/// A verification link ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVerification {
    pub email: String,
    pub url: String,
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::Validation(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn conflict_on_duplicate(error: RepositoryError) -> DomainError {
    match error {
        RepositoryError::UniqueViolation(_) => {
            DomainError::Conflict("email or username is already taken".to_string())
        }
        other => other.into(),
    }
}

pub async fn create_user(
    repository: &impl UserRepository,
    input: CreateUser,
) -> Result<User, DomainError> {
    let email = Email::try_new(input.email).map_err(DomainError::validation)?;
    let username = Username::try_new(input.username).map_err(DomainError::validation)?;
    validate_password(&input.password)?;

    let user = NewUser {
        name: input.name.filter(|n| !n.trim().is_empty()),
        username,
        email,
        password_hash: security::hash_password(&input.password)?,
        staged: false,
    };

    let user = repository
        .insert_user(user)
        .await
        .map_err(conflict_on_duplicate)?;
    tracing::info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Applies `input` to the user `id`.
///
/// Returns the updated user and, when the email address changed, the
/// verification link that has to be delivered to the new address.
pub async fn update_user(
    repository: &impl UserRepository,
    settings: &VerificationSettings,
    actor: &User,
    id: UserId,
    input: UpdateUser,
) -> Result<(User, Option<EmailVerification>), DomainError> {
    if actor.id != id && !actor.is_application_admin() {
        return Err(DomainError::Forbidden);
    }

    let mut user = repository
        .find_user(id)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    let mut email_changed = false;
    if let Some(email) = input.email {
        let email = Email::try_new(email).map_err(DomainError::validation)?;
        if email.as_ref() != user.email {
            user.email = email.into_inner();
            user.email_verified_at = None;
            email_changed = true;
        }
    }
    if let Some(username) = input.username {
        user.username = Username::try_new(username)
            .map_err(DomainError::validation)?
            .into_inner();
    }
    if let Some(name) = input.name {
        user.name = Some(name);
    }
    if let Some(password) = input.password {
        validate_password(&password)?;
        user.password_hash = security::hash_password(&password)?;
    }
    if let Some(metadata) = input.profile_metadata {
        if !metadata.is_object() {
            return Err(DomainError::validation("profile metadata must be an object"));
        }
        user.profile_metadata = metadata;
    }

    let user = repository
        .update_user(&user)
        .await
        .map_err(conflict_on_duplicate)?;

    let verification = email_changed.then(|| verification_for(settings, &user, Utc::now()));
    Ok((user, verification))
}

pub fn verification_hash(settings: &VerificationSettings, user: &User, expires: i64) -> String {
    security::sign(
        &settings.app_key,
        &format!("{}#{}#{}", user.id, user.email, expires),
    )
}

pub fn verification_for(
    settings: &VerificationSettings,
    user: &User,
    now: DateTime<Utc>,
) -> EmailVerification {
    let expires = (now + Duration::minutes(settings.expire_minutes)).timestamp();
    let hash = verification_hash(settings, user, expires);
    EmailVerification {
        email: user.email.clone(),
        url: format!(
            "{}/verify-email/{}/{}",
            settings.app_url.trim_end_matches('/'),
            expires,
            hash
        ),
    }
}

/// Re-sends a verification link to `id`, or to the actor when `id` is absent.
pub async fn send_email_verification(
    repository: &impl UserRepository,
    settings: &VerificationSettings,
    actor: &User,
    id: Option<UserId>,
) -> Result<(User, EmailVerification), DomainError> {
    let id = id.unwrap_or(actor.id);
    if id != actor.id && !actor.is_application_admin() {
        return Err(DomainError::Forbidden);
    }
    let user = repository
        .find_user(id)
        .await?
        .ok_or(DomainError::NotFound("user"))?;
    let verification = verification_for(settings, &user, Utc::now());
    Ok((user, verification))
}

pub async fn verify_email(
    repository: &impl UserRepository,
    settings: &VerificationSettings,
    actor: &User,
    token: &str,
    expires: &str,
) -> Result<User, DomainError> {
    let invalid = || DomainError::validation("verification link is invalid or expired");

    let expires_at: i64 = expires.parse().map_err(|_| invalid())?;
    if expires_at < Utc::now().timestamp() {
        return Err(invalid());
    }
    let message = format!("{}#{}#{}", actor.id, actor.email, expires);
    if !security::verify_signature(&settings.app_key, &message, token) {
        return Err(invalid());
    }

    let mut user = actor.clone();
    user.email_verified_at = Some(Utc::now());
    Ok(repository.update_user(&user).await?)
}

fn username_candidate(base: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(2)
        .map(char::from)
        .collect();
    format!("{}_{}{}", base, suffix, rng.random_range(0..=50))
}

/// Username derived from the local part of `email`, extended with random
/// text until no other user holds it.
pub async fn generate_unique_username(
    repository: &impl UserRepository,
    email: &Email,
) -> Result<String, DomainError> {
    let mut username = email.local_part().to_string();
    while repository.username_exists(&username).await? {
        username = username_candidate(&username);
    }
    Ok(username)
}

/// Creates a placeholder account for someone invited by email.
pub async fn create_staged_user(
    repository: &impl UserRepository,
    email: &str,
) -> Result<User, DomainError> {
    let email = Email::try_new(email).map_err(DomainError::validation)?;
    if let Some(existing) = repository.find_user_by_email(&email).await? {
        return Ok(existing);
    }

    let username = generate_unique_username(repository, &email).await?;
    let user = NewUser {
        name: None,
        username: Username::try_new(username).map_err(DomainError::validation)?,
        email,
        password_hash: security::hash_password(&security::random_token())?,
        staged: true,
    };
    let user = repository
        .insert_user(user)
        .await
        .map_err(conflict_on_duplicate)?;
    tracing::info!(user_id = %user.id, "staged user created");
    Ok(user)
}

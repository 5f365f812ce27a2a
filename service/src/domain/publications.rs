use chrono::{DateTime, Utc};
use folio_common::{CriteriaName, PublicationId, PublicationName, Role, StyleCriteriaId, UserId};
use serde::Serialize;

use crate::domain::{
    DomainError, RoleAssignment,
    repository::{PublicationRepository, RepositoryError, UserRepository},
    users::User,
};

pub const MAX_STYLE_CRITERIA: usize = 6;
pub const MAX_CRITERIA_DESCRIPTION: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub id: PublicationId,
    pub name: String,
    pub is_publicly_visible: bool,
    pub is_accepting_submissions: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPublication {
    pub name: PublicationName,
    pub is_publicly_visible: bool,
    pub is_accepting_submissions: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePublication {
    pub name: String,
    pub is_publicly_visible: Option<bool>,
    pub is_accepting_submissions: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleCriteria {
    pub id: StyleCriteriaId,
    pub publication_id: PublicationId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStyleCriteria {
    pub publication_id: PublicationId,
    pub name: CriteriaName,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StyleCriteriaInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// First role the user holds on the publication.
pub async fn publication_role(
    repository: &impl PublicationRepository,
    publication_id: PublicationId,
    user_id: UserId,
) -> Result<Option<Role>, DomainError> {
    let roles = repository.publication_roles(publication_id, user_id).await?;
    Ok(roles.first().copied())
}

async fn require_publication_role(
    repository: &impl PublicationRepository,
    actor: &User,
    publication_id: PublicationId,
    accepted: &[Role],
) -> Result<(), DomainError> {
    if actor.is_application_admin() {
        return Ok(());
    }
    let roles = repository.publication_roles(publication_id, actor.id).await?;
    if roles.iter().any(|role| accepted.contains(role)) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

pub async fn create_publication(
    repository: &impl PublicationRepository,
    actor: &User,
    input: CreatePublication,
) -> Result<Publication, DomainError> {
    if !actor.is_application_admin() {
        return Err(DomainError::Forbidden);
    }
    let name = PublicationName::try_new(input.name).map_err(DomainError::validation)?;

    let publication = NewPublication {
        name,
        is_publicly_visible: input.is_publicly_visible.unwrap_or(true),
        is_accepting_submissions: input.is_accepting_submissions.unwrap_or(true),
    };
    let publication = repository
        .insert_publication(publication)
        .await
        .map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => {
                DomainError::Conflict("a publication with this name already exists".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(publication_id = %publication.id, "publication created");
    Ok(publication)
}

/// Publicly visible publications, or every publication for administrators.
pub async fn list_publications(
    repository: &impl PublicationRepository,
    actor: Option<&User>,
) -> Result<Vec<Publication>, DomainError> {
    let all = actor.is_some_and(User::is_application_admin);
    Ok(repository.list_publications(!all).await?)
}

pub async fn find_publication(
    repository: &impl PublicationRepository,
    actor: Option<&User>,
    id: PublicationId,
) -> Result<Publication, DomainError> {
    let publication = repository
        .find_publication(id)
        .await?
        .ok_or(DomainError::NotFound("publication"))?;

    if publication.is_publicly_visible {
        return Ok(publication);
    }
    let Some(actor) = actor else {
        return Err(DomainError::NotFound("publication"));
    };
    if actor.is_application_admin() || publication_role(repository, id, actor.id).await?.is_some() {
        Ok(publication)
    } else {
        Err(DomainError::NotFound("publication"))
    }
}

pub async fn assign_publication_user<R>(
    repository: &R,
    actor: &User,
    publication_id: PublicationId,
    user_id: UserId,
    role: Role,
) -> Result<(), DomainError>
where
    R: PublicationRepository + UserRepository,
{
    if !role.is_publication_role() {
        return Err(DomainError::Validation(format!(
            "{} cannot be assigned on a publication",
            role
        )));
    }
    require_publication_role(repository, actor, publication_id, &[Role::PublicationAdministrator]).await?;

    repository
        .find_publication(publication_id)
        .await?
        .ok_or(DomainError::NotFound("publication"))?;
    repository
        .find_user(user_id)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    repository
        .attach_publication_user(publication_id, user_id, role)
        .await
        .map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => {
                DomainError::Conflict("the user already holds this role".to_string())
            }
            other => other.into(),
        })?;
    tracing::info!(%publication_id, %user_id, %role, "publication role assigned");
    Ok(())
}

/// Role assignments of a publication, visible to its staff.
pub async fn publication_users(
    repository: &impl PublicationRepository,
    actor: &User,
    publication_id: PublicationId,
) -> Result<Vec<RoleAssignment>, DomainError> {
    require_publication_role(repository, actor, publication_id, PUBLICATION_STAFF).await?;
    Ok(repository.publication_users(publication_id).await?)
}

pub async fn remove_publication_user(
    repository: &impl PublicationRepository,
    actor: &User,
    publication_id: PublicationId,
    user_id: UserId,
    role: Role,
) -> Result<(), DomainError> {
    require_publication_role(repository, actor, publication_id, &[Role::PublicationAdministrator]).await?;

    if repository
        .detach_publication_user(publication_id, user_id, role)
        .await?
    {
        Ok(())
    } else {
        Err(DomainError::NotFound("role assignment"))
    }
}

fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
    match description {
        Some(d) if d.chars().count() > MAX_CRITERIA_DESCRIPTION => Err(DomainError::Validation(
            format!("description must not exceed {} characters", MAX_CRITERIA_DESCRIPTION),
        )),
        _ => Ok(()),
    }
}

const PUBLICATION_STAFF: &[Role] = &[Role::PublicationAdministrator, Role::Editor];

pub async fn create_style_criteria(
    repository: &impl PublicationRepository,
    actor: &User,
    publication_id: PublicationId,
    input: StyleCriteriaInput,
) -> Result<StyleCriteria, DomainError> {
    require_publication_role(repository, actor, publication_id, PUBLICATION_STAFF).await?;

    let name = CriteriaName::try_new(input.name.unwrap_or_default())
        .map_err(DomainError::validation)?;
    validate_description(&input.description)?;

    let existing = repository.style_criteria(publication_id).await?;
    if existing.len() >= MAX_STYLE_CRITERIA {
        return Err(DomainError::Validation(format!(
            "a publication has at most {} style criteria",
            MAX_STYLE_CRITERIA
        )));
    }

    let criteria = NewStyleCriteria {
        publication_id,
        name,
        description: input.description,
        icon: input.icon,
    };
    Ok(repository.insert_style_criteria(criteria).await?)
}

/// Style criteria of a publication the actor is able to see.
pub async fn list_style_criteria(
    repository: &impl PublicationRepository,
    actor: Option<&User>,
    publication_id: PublicationId,
) -> Result<Vec<StyleCriteria>, DomainError> {
    find_publication(repository, actor, publication_id).await?;
    Ok(repository.style_criteria(publication_id).await?)
}

pub async fn update_style_criteria(
    repository: &impl PublicationRepository,
    actor: &User,
    id: StyleCriteriaId,
    input: StyleCriteriaInput,
) -> Result<StyleCriteria, DomainError> {
    let mut criteria = repository
        .find_style_criteria(id)
        .await?
        .ok_or(DomainError::NotFound("style criteria"))?;
    require_publication_role(repository, actor, criteria.publication_id, PUBLICATION_STAFF).await?;

    if let Some(name) = input.name {
        criteria.name = CriteriaName::try_new(name)
            .map_err(DomainError::validation)?
            .into_inner();
    }
    if input.description.is_some() {
        validate_description(&input.description)?;
        criteria.description = input.description;
    }
    if input.icon.is_some() {
        criteria.icon = input.icon;
    }
    Ok(repository.update_style_criteria(&criteria).await?)
}

pub async fn delete_style_criteria(
    repository: &impl PublicationRepository,
    actor: &User,
    id: StyleCriteriaId,
) -> Result<StyleCriteria, DomainError> {
    let criteria = repository
        .find_style_criteria(id)
        .await?
        .ok_or(DomainError::NotFound("style criteria"))?;
    require_publication_role(repository, actor, criteria.publication_id, PUBLICATION_STAFF).await?;

    repository.delete_style_criteria(id).await?;
    Ok(criteria)
}

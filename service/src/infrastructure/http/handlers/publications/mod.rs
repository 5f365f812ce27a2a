use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use folio_common::{PublicationId, Role, StyleCriteriaId, UserId};

use crate::domain::{
    AppState, RoleAssignment,
    publications::{self, Publication, StyleCriteria},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::publications::dto::{
    AssignUserRequest, AssignmentResponse, CreatePublicationRequest, StyleCriteriaRequest,
};
use crate::infrastructure::http::session::{CurrentUser, MaybeUser};

mod dto;

fn role(id: i16) -> Result<Role, ApiError> {
    Role::try_from(id).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))
}

pub async fn list_publications<S: AppState>(
    State(state): State<S>,
    MaybeUser(user): MaybeUser,
) -> Result<ApiSuccess<Vec<Publication>>, ApiError> {
    let result = publications::list_publications(state.repository(), user.as_ref()).await?;
    Ok(ApiSuccess::ok(result))
}

pub async fn create_publication<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Json(body): Json<CreatePublicationRequest>,
) -> Result<ApiSuccess<Publication>, ApiError> {
    let publication =
        publications::create_publication(state.repository(), &actor, body.into()).await?;
    Ok(ApiSuccess::created(publication))
}

pub async fn find_publication<S: AppState>(
    State(state): State<S>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<PublicationId>,
) -> Result<ApiSuccess<Publication>, ApiError> {
    let publication = publications::find_publication(state.repository(), user.as_ref(), id).await?;
    Ok(ApiSuccess::ok(publication))
}

pub async fn publication_users<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<PublicationId>,
) -> Result<ApiSuccess<Vec<RoleAssignment>>, ApiError> {
    let users = publications::publication_users(state.repository(), &actor, id).await?;
    Ok(ApiSuccess::ok(users))
}

pub async fn assign_user<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<PublicationId>,
    Json(body): Json<AssignUserRequest>,
) -> Result<ApiSuccess<AssignmentResponse>, ApiError> {
    let role = role(body.role_id)?;
    publications::assign_publication_user(state.repository(), &actor, id, body.user_id, role)
        .await?;
    Ok(ApiSuccess::created(AssignmentResponse {
        user_id: body.user_id,
        role_id: role.id(),
        role_name: role.name(),
    }))
}

pub async fn remove_user<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path((id, user_id, role_id)): Path<(PublicationId, UserId, i16)>,
) -> Result<StatusCode, ApiError> {
    let role = role(role_id)?;
    publications::remove_publication_user(state.repository(), &actor, id, user_id, role).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_style_criteria<S: AppState>(
    State(state): State<S>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<PublicationId>,
) -> Result<ApiSuccess<Vec<StyleCriteria>>, ApiError> {
    let criteria = publications::list_style_criteria(state.repository(), user.as_ref(), id).await?;
    Ok(ApiSuccess::ok(criteria))
}

pub async fn create_style_criteria<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<PublicationId>,
    Json(body): Json<StyleCriteriaRequest>,
) -> Result<ApiSuccess<StyleCriteria>, ApiError> {
    let criteria =
        publications::create_style_criteria(state.repository(), &actor, id, body.into()).await?;
    Ok(ApiSuccess::created(criteria))
}

pub async fn update_style_criteria<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<StyleCriteriaId>,
    Json(body): Json<StyleCriteriaRequest>,
) -> Result<ApiSuccess<StyleCriteria>, ApiError> {
    let criteria =
        publications::update_style_criteria(state.repository(), &actor, id, body.into()).await?;
    Ok(ApiSuccess::ok(criteria))
}

pub async fn delete_style_criteria<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<StyleCriteriaId>,
) -> Result<ApiSuccess<StyleCriteria>, ApiError> {
    let criteria = publications::delete_style_criteria(state.repository(), &actor, id).await?;
    Ok(ApiSuccess::ok(criteria))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::infrastructure::http::handlers::testing::*;
    use crate::infrastructure::memory::{MemoryRepository, fixtures};

    #[tokio::test]
    async fn admins_build_a_publication_and_its_staff() {
        let repository = MemoryRepository::default();
        fixtures::admin(&repository).await;
        let editor = fixtures::user(&repository, "editor").await;
        let app = app(state(&repository));
        let admin = sign_in(&app, "admin@example.org").await;

        let body = json!({ "name": "  Journal of Tests  ", "is_publicly_visible": false });
        let (status, created) = send(&app, request("POST", "/api/publications", Some(&admin), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["name"], "Journal of Tests");
        let id = created["data"]["id"].as_i64().unwrap();

        let hidden = format!("/api/publications/{}", id);
        let (status, _) = send(&app, request("GET", &hidden, None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let users = format!("/api/publications/{}/users", id);
        let body = json!({ "user_id": editor.id, "role_id": 3 });
        let (status, _) = send(&app, request("POST", &users, Some(&admin), Some(body.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, request("POST", &users, Some(&admin), Some(body))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let editor_token = sign_in(&app, "editor@example.org").await;
        let (status, _) = send(&app, request("GET", &hidden, Some(&editor_token), None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, listed) = send(&app, request("GET", &users, Some(&editor_token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let removal = format!("/api/publications/{}/users/{}/3", id, editor.id);
        let (status, _) = send(&app, request("DELETE", &removal, Some(&editor_token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, request("DELETE", &removal, Some(&admin), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn submission_roles_cannot_be_assigned_on_publications() {
        let repository = MemoryRepository::default();
        fixtures::admin(&repository).await;
        let user = fixtures::user(&repository, "reviewer").await;
        let publication = fixtures::publication(&repository, "Open Journal").await;
        let app = app(state(&repository));
        let admin = sign_in(&app, "admin@example.org").await;

        let uri = format!("/api/publications/{}/users", publication.id);
        for role_id in [5, 42] {
            let body = json!({ "user_id": user.id, "role_id": role_id });
            let (status, _) = send(&app, request("POST", &uri, Some(&admin), Some(body))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn style_criteria_are_managed_by_staff() {
        let repository = MemoryRepository::default();
        fixtures::admin(&repository).await;
        fixtures::user(&repository, "reader").await;
        let publication = fixtures::publication(&repository, "Open Journal").await;
        let app = app(state(&repository));
        let admin = sign_in(&app, "admin@example.org").await;
        let reader = sign_in(&app, "reader@example.org").await;

        let uri = format!("/api/publications/{}/style-criteria", publication.id);
        let body = json!({ "name": "Clarity", "description": "Plain words" });
        let (status, _) = send(&app, request("POST", &uri, Some(&reader), Some(body.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, created) = send(&app, request("POST", &uri, Some(&admin), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_i64().unwrap();

        let item = format!("/api/style-criteria/{}", id);
        let (status, updated) =
            send(&app, request("PUT", &item, Some(&admin), Some(json!({ "icon": "eye" })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["name"], "Clarity");
        assert_eq!(updated["data"]["icon"], "eye");

        let (status, listed) = send(&app, request("GET", &uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, request("DELETE", &item, Some(&admin), None)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, listed) = send(&app, request("GET", &uri, None, None)).await;
        assert!(listed["data"].as_array().unwrap().is_empty());
    }
}

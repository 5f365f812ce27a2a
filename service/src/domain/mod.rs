use chrono::{DateTime, Utc};
use folio_common::{Role, UserId};
use serde::Serialize;

use crate::domain::notifications::StatusNotifier;
use crate::domain::repository::Repository;

pub mod access;
pub mod auth;
pub mod comments;
pub mod error;
pub mod navigation;
pub mod notifications;
pub mod publications;
pub mod repository;
pub mod security;
pub mod submissions;
pub mod users;

pub use error::DomainError;

/// Settings the domain needs to sign and build verification links.
#[derive(Debug, Clone)]
pub struct VerificationSettings {
    pub app_url: String,
    pub app_key: String,
    pub expire_minutes: i64,
}

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: Repository;
    type N: StatusNotifier;
    fn repository(&self) -> &Self::R;
    fn notifier(&self) -> &Self::N;
    fn verification(&self) -> &VerificationSettings;
}

/// Pivot row linking a user to a publication or a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub id: i64,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

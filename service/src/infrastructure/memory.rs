//! In-memory repository and notifier backing the unit and handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use folio_common::{
    CommentId, ContentId, Email, NotificationId, PublicationId, Role, StyleCriteriaId,
    SubmissionId, SubmissionStatus, UserId,
};
use serde_json::json;

use crate::domain::{
    RoleAssignment,
    comments::{Comment, NewComment},
    notifications::{NewNotification, Notification, StatusChanged, StatusNotifier},
    publications::{NewPublication, NewStyleCriteria, Publication, StyleCriteria},
    repository::{
        CommentRepository, NotificationRepository, PublicationRepository, RepositoryError,
        SessionRepository, SubmissionRepository, UserRepository,
    },
    submissions::{NewSubmission, RoleChanges, Submission, SubmissionContent, UserSubmission},
    users::{NewUser, User},
};

#[derive(Default)]
struct Store {
    sequence: i64,
    users: Vec<User>,
    global_roles: Vec<(UserId, Role)>,
    sessions: HashMap<String, UserId>,
    publications: Vec<Publication>,
    publication_users: Vec<(PublicationId, RoleAssignment)>,
    style_criteria: Vec<StyleCriteria>,
    submissions: Vec<Submission>,
    submission_users: Vec<(SubmissionId, RoleAssignment)>,
    contents: Vec<SubmissionContent>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn with_roles(&self, mut user: User) -> User {
        user.roles = self
            .global_roles
            .iter()
            .filter(|(id, _)| *id == user.id)
            .map(|(_, role)| role.name().to_string())
            .collect();
        user
    }

    fn assignment(&mut self, user_id: UserId, role: Role) -> RoleAssignment {
        RoleAssignment {
            id: self.next_id(),
            user_id,
            role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
}

impl MemoryRepository {
    fn store(&self) -> MutexGuard<'_, Store> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl UserRepository for MemoryRepository {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let store = self.store();
        Ok(store
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(|u| store.with_roles(u)))
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let store = self.store();
        Ok(store
            .users
            .iter()
            .find(|u| u.email == email.as_ref())
            .cloned()
            .map(|u| store.with_roles(u)))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        Ok(self.store().users.iter().any(|u| u.username == username))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut store = self.store();
        let email = user.email.into_inner();
        let username = user.username.into_inner();
        if store
            .users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(RepositoryError::UniqueViolation("users".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId(store.next_id()),
            name: user.name,
            username,
            email,
            password_hash: user.password_hash,
            profile_metadata: json!({}),
            email_verified_at: None,
            staged: user.staged,
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut store = self.store();
        if store
            .users
            .iter()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(RepositoryError::UniqueViolation("users".to_string()));
        }
        let stored = store
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        let updated = stored.clone();
        Ok(store.with_roles(updated))
    }

    async fn assign_global_role(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        let mut store = self.store();
        if !store.global_roles.contains(&(user_id, role)) {
            store.global_roles.push((user_id, role));
        }
        Ok(())
    }
}

impl SessionRepository for MemoryRepository {
    async fn create_session(&self, token: &str, user_id: UserId) -> Result<(), RepositoryError> {
        self.store().sessions.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.store().sessions.get(token).copied())
    }

    async fn delete_session(&self, token: &str) -> Result<(), RepositoryError> {
        self.store().sessions.remove(token);
        Ok(())
    }
}

impl PublicationRepository for MemoryRepository {
    async fn insert_publication(&self, publication: NewPublication) -> Result<Publication, RepositoryError> {
        let mut store = self.store();
        let name = publication.name.into_inner();
        if store.publications.iter().any(|p| p.name == name) {
            return Err(RepositoryError::UniqueViolation("publications.name".to_string()));
        }
        let now = Utc::now();
        let publication = Publication {
            id: PublicationId(store.next_id()),
            name,
            is_publicly_visible: publication.is_publicly_visible,
            is_accepting_submissions: publication.is_accepting_submissions,
            created_at: now,
            updated_at: now,
        };
        store.publications.push(publication.clone());
        Ok(publication)
    }

    async fn find_publication(&self, id: PublicationId) -> Result<Option<Publication>, RepositoryError> {
        Ok(self.store().publications.iter().find(|p| p.id == id).cloned())
    }

    async fn list_publications(&self, only_publicly_visible: bool) -> Result<Vec<Publication>, RepositoryError> {
        Ok(self
            .store()
            .publications
            .iter()
            .filter(|p| !only_publicly_visible || p.is_publicly_visible)
            .cloned()
            .collect())
    }

    async fn publication_roles(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
    ) -> Result<Vec<Role>, RepositoryError> {
        Ok(self
            .store()
            .publication_users
            .iter()
            .filter(|(id, a)| *id == publication_id && a.user_id == user_id)
            .map(|(_, a)| a.role)
            .collect())
    }

    async fn publication_users(&self, publication_id: PublicationId) -> Result<Vec<RoleAssignment>, RepositoryError> {
        Ok(self
            .store()
            .publication_users
            .iter()
            .filter(|(id, _)| *id == publication_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn attach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store();
        if store
            .publication_users
            .iter()
            .any(|(id, a)| *id == publication_id && a.user_id == user_id && a.role == role)
        {
            return Err(RepositoryError::UniqueViolation("publication_user".to_string()));
        }
        let assignment = store.assignment(user_id, role);
        store.publication_users.push((publication_id, assignment));
        Ok(())
    }

    async fn detach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> Result<bool, RepositoryError> {
        let mut store = self.store();
        let before = store.publication_users.len();
        store
            .publication_users
            .retain(|(id, a)| !(*id == publication_id && a.user_id == user_id && a.role == role));
        Ok(store.publication_users.len() != before)
    }

    async fn style_criteria(&self, publication_id: PublicationId) -> Result<Vec<StyleCriteria>, RepositoryError> {
        Ok(self
            .store()
            .style_criteria
            .iter()
            .filter(|c| c.publication_id == publication_id)
            .cloned()
            .collect())
    }

    async fn find_style_criteria(&self, id: StyleCriteriaId) -> Result<Option<StyleCriteria>, RepositoryError> {
        Ok(self.store().style_criteria.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_style_criteria(&self, criteria: NewStyleCriteria) -> Result<StyleCriteria, RepositoryError> {
        let mut store = self.store();
        let criteria = StyleCriteria {
            id: StyleCriteriaId(store.next_id()),
            publication_id: criteria.publication_id,
            name: criteria.name.into_inner(),
            description: criteria.description,
            icon: criteria.icon,
        };
        store.style_criteria.push(criteria.clone());
        Ok(criteria)
    }

    async fn update_style_criteria(&self, criteria: &StyleCriteria) -> Result<StyleCriteria, RepositoryError> {
        let mut store = self.store();
        let stored = store
            .style_criteria
            .iter_mut()
            .find(|c| c.id == criteria.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = criteria.clone();
        Ok(criteria.clone())
    }

    async fn delete_style_criteria(&self, id: StyleCriteriaId) -> Result<(), RepositoryError> {
        self.store().style_criteria.retain(|c| c.id != id);
        Ok(())
    }
}

impl SubmissionRepository for MemoryRepository {
    async fn insert_submission(&self, submission: NewSubmission) -> Result<Submission, RepositoryError> {
        let mut store = self.store();
        let now = Utc::now();
        let submission = Submission {
            id: SubmissionId(store.next_id()),
            title: submission.title.into_inner(),
            publication_id: submission.publication_id,
            status: SubmissionStatus::Draft,
            status_change_comment: None,
            content_id: None,
            created_by: submission.created_by,
            updated_by: submission.created_by,
            created_at: now,
            updated_at: now,
        };
        let assignment = store.assignment(submission.created_by, Role::Submitter);
        store.submission_users.push((submission.id, assignment));
        store.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Ok(self.store().submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn update_submission(
        &self,
        submission: &Submission,
        changes: &RoleChanges,
    ) -> Result<Submission, RepositoryError> {
        let mut store = self.store();
        let stored = store
            .submissions
            .iter_mut()
            .find(|s| s.id == submission.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = Submission {
            content_id: stored.content_id,
            updated_at: Utc::now(),
            ..submission.clone()
        };
        let updated = stored.clone();

        store.submission_users.retain(|(id, a)| {
            *id != submission.id || !changes.detach.contains(&(a.user_id, a.role))
        });
        for (user_id, role) in &changes.attach {
            let assignment = store.assignment(*user_id, *role);
            store.submission_users.push((submission.id, assignment));
        }
        Ok(updated)
    }

    async fn submission_users(&self, submission_id: SubmissionId) -> Result<Vec<RoleAssignment>, RepositoryError> {
        Ok(self
            .store()
            .submission_users
            .iter()
            .filter(|(id, _)| *id == submission_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn attach_submission_user(
        &self,
        submission_id: SubmissionId,
        user_id: UserId,
        role: Role,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store();
        let assignment = store.assignment(user_id, role);
        store.submission_users.push((submission_id, assignment));
        Ok(())
    }

    async fn submissions_for_user(&self, user_id: UserId) -> Result<Vec<UserSubmission>, RepositoryError> {
        let store = self.store();
        Ok(store
            .submission_users
            .iter()
            .filter(|(_, a)| a.user_id == user_id)
            .filter_map(|(id, a)| {
                store.submissions.iter().find(|s| s.id == *id).map(|s| UserSubmission {
                    submission_id: s.id,
                    title: s.title.clone(),
                    publication_id: s.publication_id,
                    status: s.status,
                    role: a.role,
                })
            })
            .collect())
    }

    async fn append_content(&self, submission_id: SubmissionId, data: String) -> Result<SubmissionContent, RepositoryError> {
        let mut store = self.store();
        let content = SubmissionContent {
            id: ContentId(store.next_id()),
            submission_id,
            data,
            created_at: Utc::now(),
        };
        let submission = store
            .submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
            .ok_or(RepositoryError::NotFound)?;
        submission.content_id = Some(content.id);
        store.contents.push(content.clone());
        Ok(content)
    }

    async fn content_history(&self, submission_id: SubmissionId) -> Result<Vec<SubmissionContent>, RepositoryError> {
        Ok(self
            .store()
            .contents
            .iter()
            .filter(|c| c.submission_id == submission_id)
            .cloned()
            .collect())
    }
}

impl CommentRepository for MemoryRepository {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, RepositoryError> {
        let mut store = self.store();
        let now = Utc::now();
        let comment = Comment {
            id: CommentId(store.next_id()),
            submission_id: comment.submission_id,
            kind: comment.kind,
            content: comment.content,
            parent_id: comment.parent_id,
            reply_to_id: comment.reply_to_id,
            created_by: comment.created_by,
            updated_by: comment.created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        Ok(self.store().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_for_submission(&self, submission_id: SubmissionId) -> Result<Vec<Comment>, RepositoryError> {
        Ok(self
            .store()
            .comments
            .iter()
            .filter(|c| c.submission_id == submission_id && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn soft_delete_comment(&self, id: CommentId) -> Result<(), RepositoryError> {
        let mut store = self.store();
        let comment = store
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        comment.deleted_at = Some(Utc::now());
        Ok(())
    }
}

impl NotificationRepository for MemoryRepository {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let mut store = self.store();
        let notification = Notification {
            id: NotificationId(store.next_id()),
            user_id: notification.user_id,
            kind: notification.kind,
            data: notification.data,
            read_at: None,
            created_at: Utc::now(),
        };
        store.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        Ok(self
            .store()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, user_id: UserId, id: NotificationId) -> Result<bool, RepositoryError> {
        let mut store = self.store();
        match store
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read_at.get_or_insert_with(Utc::now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut store = self.store();
        let now = Utc::now();
        let mut count = 0;
        for notification in store
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
        {
            notification.read_at = Some(now);
            count += 1;
        }
        Ok(count)
    }
}

/// Keeps every status change instead of dispatching it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<StatusChanged>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<StatusChanged> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatusNotifier for RecordingNotifier {
    fn status_changed(&self, event: StatusChanged) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub mod fixtures {
    use folio_common::{PublicationName, SubmissionTitle, Username};

    use super::*;
    use crate::domain::security;

    pub const PASSWORD: &str = "password123";

    pub async fn user(repository: &MemoryRepository, username: &str) -> User {
        let user = NewUser {
            name: None,
            username: Username::try_new(username).unwrap(),
            email: Email::try_new(format!("{}@example.org", username)).unwrap(),
            password_hash: security::hash_password(PASSWORD).unwrap(),
            staged: false,
        };
        repository.insert_user(user).await.unwrap()
    }

    pub async fn admin(repository: &MemoryRepository) -> User {
        let admin = user(repository, "admin").await;
        repository
            .assign_global_role(admin.id, Role::ApplicationAdministrator)
            .await
            .unwrap();
        repository.find_user(admin.id).await.unwrap().unwrap()
    }

    pub async fn publication(repository: &MemoryRepository, name: &str) -> Publication {
        repository
            .insert_publication(NewPublication {
                name: PublicationName::try_new(name).unwrap(),
                is_publicly_visible: true,
                is_accepting_submissions: true,
            })
            .await
            .unwrap()
    }

    /// A draft in a fresh publication, submitted by `submitter`.
    pub async fn submission(repository: &MemoryRepository, submitter: &User, title: &str) -> Submission {
        let publication = publication(repository, &format!("{} Journal", title)).await;
        repository
            .insert_submission(NewSubmission {
                title: SubmissionTitle::try_new(title).unwrap(),
                publication_id: publication.id,
                created_by: submitter.id,
            })
            .await
            .unwrap()
    }
}

//! Server side evaluation of the client's navigation guards.
//!
//! A [`RouteTable`] mirrors the client routes together with their guard
//! flags. [`Navigator::resolve`] runs the guards for a path in the order the
//! client runs them, each one awaiting the previous:
//! authentication, global roles, submission membership and finally the
//! per page access checks, which defer to the shared access policy.

use std::collections::HashMap;
use std::future::Future;

use folio_common::{
    AccessCategory, AccessContext, AccessDecision, PublicationId, Role, SubmissionId,
    SubmissionStatus, UserId,
    access::{FORBIDDEN_PATH, LOGIN_PATH, effective_submission_role, evaluate},
};
use serde::Serialize;

use crate::domain::{
    DomainError,
    repository::{PublicationRepository, SubmissionRepository},
    submissions::UserSubmission,
    users::User,
};

/// Guard flags of one route record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_roles: Vec<String>,
    pub requires_submission_access: bool,
    /// Set for the draft, preview, view, review and export pages
    pub requires_access: Option<AccessCategory>,
}

#[derive(Debug, Clone)]
pub struct RouteRecord {
    path: &'static str,
    meta: RouteMeta,
    children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn requires_roles(mut self, roles: &[&str]) -> Self {
        self.meta.requires_roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn requires_submission_access(mut self) -> Self {
        self.meta.requires_submission_access = true;
        self
    }

    pub fn requires_access(mut self, category: AccessCategory) -> Self {
        self.meta.requires_access = Some(category);
        self
    }

    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    segments: Vec<Segment>,
    matched: Vec<RouteMeta>,
}

/// A path matched against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub full_path: String,
    pub params: HashMap<String, String>,
    /// Metadata of the matched record and all of its ancestors, outermost first
    pub matched: &'a [RouteMeta],
}

impl RouteMatch<'_> {
    fn any(&self, flag: impl Fn(&RouteMeta) -> bool) -> bool {
        self.matched.iter().any(flag)
    }

    fn required_roles(&self) -> Vec<&str> {
        self.matched
            .iter()
            .flat_map(|meta| meta.requires_roles.iter().map(String::as_str))
            .collect()
    }

    fn categories(&self) -> Vec<AccessCategory> {
        self.matched.iter().filter_map(|meta| meta.requires_access).collect()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        let mut routes = Vec::new();
        for record in &records {
            Self::flatten(record, "", &[], &mut routes);
        }
        Self { routes }
    }

    fn flatten(record: &RouteRecord, parent: &str, ancestors: &[RouteMeta], routes: &mut Vec<Route>) {
        let path = if record.path.starts_with('/') {
            record.path.to_string()
        } else {
            format!("{}/{}", parent.trim_end_matches('/'), record.path)
        };
        let mut matched = ancestors.to_vec();
        matched.push(record.meta.clone());

        routes.push(Route {
            segments: segments(&path)
                .map(|s| match s.strip_prefix(':') {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Static(s.to_string()),
                })
                .collect(),
            matched: matched.clone(),
        });
        for child in &record.children {
            Self::flatten(child, &path, &matched, routes);
        }
    }

    /// First route matching `full_path`; query string and fragment are ignored.
    pub fn find(&self, full_path: &str) -> Option<RouteMatch<'_>> {
        let path = full_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let parts: Vec<&str> = segments(path).collect();

        self.routes.iter().find_map(|route| {
            if route.segments.len() != parts.len() {
                return None;
            }
            let mut params = HashMap::new();
            for (segment, part) in route.segments.iter().zip(&parts) {
                match segment {
                    Segment::Static(s) if s == part => {}
                    Segment::Static(_) => return None,
                    Segment::Param(name) => {
                        params.insert(name.clone(), part.to_string());
                    }
                }
            }
            Some(RouteMatch {
                full_path: full_path.to_string(),
                params,
                matched: &route.matched,
            })
        })
    }
}

impl Default for RouteTable {
    /// The routes of the web client.
    fn default() -> Self {
        let admin = Role::ApplicationAdministrator.name();
        let submission_pages = AccessCategory::ALL
            .into_iter()
            .map(|category| RouteRecord::new(category.path_segment()).requires_access(category))
            .collect();

        Self::new(vec![
            RouteRecord::new("/").children(vec![
                RouteRecord::new(""),
                RouteRecord::new("register"),
                RouteRecord::new("login"),
            ]),
            RouteRecord::new("/").requires_auth().children(vec![
                RouteRecord::new("verify-email/:expires/:token"),
                RouteRecord::new("dashboard/"),
                RouteRecord::new("account/").children(vec![RouteRecord::new("profile")]),
                RouteRecord::new("feed/"),
                RouteRecord::new("/admin/users").requires_roles(&[admin]),
                RouteRecord::new("/admin/user/:id"),
                RouteRecord::new("/admin/publications").requires_roles(&[admin]),
                RouteRecord::new("/publications"),
                RouteRecord::new("/publication/:id"),
                RouteRecord::new("/submissions"),
                RouteRecord::new("/submission/:id")
                    .requires_submission_access()
                    .children(submission_pages),
            ]),
            RouteRecord::new(FORBIDDEN_PATH),
        ])
    }
}

/// The signed in user as the guards see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: UserId,
    /// Global role names
    pub roles: Vec<String>,
}

impl Viewer {
    pub fn is_application_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r == Role::ApplicationAdministrator.name())
    }
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            roles: user.roles.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub id: SubmissionId,
    pub publication_id: PublicationId,
    pub status: SubmissionStatus,
}

/// Data the guards ask for while resolving a path.
pub trait NavigationQueries: Send + Sync {
    fn current_user(&self) -> impl Future<Output = Result<Option<Viewer>, DomainError>> + Send;

    /// Every direct submission role of the current user
    fn current_user_submissions(
        &self,
    ) -> impl Future<Output = Result<Vec<UserSubmission>, DomainError>> + Send;

    /// Roles of the current user on a publication
    fn publication_roles(
        &self,
        publication_id: PublicationId,
    ) -> impl Future<Output = Result<Vec<Role>, DomainError>> + Send;

    fn submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<SubmissionSummary>, DomainError>> + Send;
}

/// Answers guard queries for the user of the current request.
pub struct RepositoryQueries<'a, R> {
    repository: &'a R,
    user: Option<&'a User>,
}

impl<'a, R> RepositoryQueries<'a, R> {
    pub fn new(repository: &'a R, user: Option<&'a User>) -> Self {
        Self { repository, user }
    }
}

impl<R> NavigationQueries for RepositoryQueries<'_, R>
where
    R: PublicationRepository + SubmissionRepository,
{
    async fn current_user(&self) -> Result<Option<Viewer>, DomainError> {
        Ok(self.user.map(Viewer::from))
    }

    async fn current_user_submissions(&self) -> Result<Vec<UserSubmission>, DomainError> {
        match self.user {
            Some(user) => Ok(self.repository.submissions_for_user(user.id).await?),
            None => Err(DomainError::Unauthenticated),
        }
    }

    async fn publication_roles(&self, publication_id: PublicationId) -> Result<Vec<Role>, DomainError> {
        match self.user {
            Some(user) => Ok(self
                .repository
                .publication_roles(publication_id, user.id)
                .await?),
            None => Err(DomainError::Unauthenticated),
        }
    }

    async fn submission(&self, id: SubmissionId) -> Result<Option<SubmissionSummary>, DomainError> {
        Ok(self
            .repository
            .find_submission(id)
            .await?
            .map(|s| SubmissionSummary {
                id: s.id,
                publication_id: s.publication_id,
                status: s.status,
            }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Proceed,
    Redirect {
        to: String,
        /// Path to return to after signing in
        #[serde(skip_serializing_if = "Option::is_none")]
        remember: Option<String>,
    },
    NotFound,
}

impl NavigationOutcome {
    fn forbidden() -> Self {
        Self::Redirect {
            to: FORBIDDEN_PATH.to_string(),
            remember: None,
        }
    }

    fn redirect(to: String) -> Self {
        Self::Redirect { to, remember: None }
    }
}

// what a single guard decided
enum Guard {
    Next,
    Stop(NavigationOutcome),
}

pub struct Navigator<'a, Q> {
    routes: &'a RouteTable,
    queries: &'a Q,
}

impl<'a, Q: NavigationQueries> Navigator<'a, Q> {
    pub fn new(routes: &'a RouteTable, queries: &'a Q) -> Self {
        Self { routes, queries }
    }

    pub async fn resolve(&self, full_path: &str) -> NavigationOutcome {
        let Some(route) = self.routes.find(full_path) else {
            return NavigationOutcome::NotFound;
        };

        match self.run_guards(&route).await {
            Ok(Guard::Next) => NavigationOutcome::Proceed,
            Ok(Guard::Stop(outcome)) => outcome,
            Err(e) => {
                tracing::warn!(path = full_path, "navigation guard failed: {}", e);
                NavigationOutcome::forbidden()
            }
        }
    }

    async fn run_guards(&self, route: &RouteMatch<'_>) -> Result<Guard, DomainError> {
        let needs_user = route.any(|m| {
            m.requires_auth
                || !m.requires_roles.is_empty()
                || m.requires_submission_access
                || m.requires_access.is_some()
        });
        if !needs_user {
            return Ok(Guard::Next);
        }
        let user = self.queries.current_user().await?;

        let user = match user {
            Some(user) => user,
            None if route.any(|m| m.requires_auth) => {
                return Ok(Guard::Stop(NavigationOutcome::Redirect {
                    to: LOGIN_PATH.to_string(),
                    remember: Some(route.full_path.clone()),
                }));
            }
            None => return Ok(Guard::Stop(NavigationOutcome::forbidden())),
        };

        if let Guard::Stop(outcome) = self.requires_roles(route, &user) {
            return Ok(Guard::Stop(outcome));
        }
        if route.any(|m| m.requires_submission_access) {
            if let Guard::Stop(outcome) = self.requires_submission_access(route, &user).await? {
                return Ok(Guard::Stop(outcome));
            }
        }
        for category in route.categories() {
            if let Guard::Stop(outcome) = self.requires_access(route, &user, category).await? {
                return Ok(Guard::Stop(outcome));
            }
        }
        Ok(Guard::Next)
    }

    fn requires_roles(&self, route: &RouteMatch<'_>, user: &Viewer) -> Guard {
        let missing = route
            .required_roles()
            .into_iter()
            .find(|required| !user.roles.iter().any(|r| r == required));
        match missing {
            Some(role) => {
                tracing::debug!(user_id = %user.id, role, "missing required role");
                Guard::Stop(NavigationOutcome::forbidden())
            }
            None => Guard::Next,
        }
    }

    async fn requires_submission_access(
        &self,
        route: &RouteMatch<'_>,
        user: &Viewer,
    ) -> Result<Guard, DomainError> {
        let Some(id) = submission_param(route) else {
            return Ok(Guard::Stop(NavigationOutcome::forbidden()));
        };
        if user.is_application_admin() {
            return Ok(Guard::Next);
        }

        let submissions = self.queries.current_user_submissions().await?;
        if submissions.iter().any(|s| s.submission_id == id) {
            return Ok(Guard::Next);
        }
        if self.publication_staff(id).await? {
            return Ok(Guard::Next);
        }
        Ok(Guard::Stop(NavigationOutcome::forbidden()))
    }

    async fn publication_staff(&self, id: SubmissionId) -> Result<bool, DomainError> {
        match self.queries.submission(id).await? {
            Some(summary) => Ok(!self
                .queries
                .publication_roles(summary.publication_id)
                .await?
                .is_empty()),
            None => Ok(false),
        }
    }

    async fn requires_access(
        &self,
        route: &RouteMatch<'_>,
        user: &Viewer,
        category: AccessCategory,
    ) -> Result<Guard, DomainError> {
        let Some(id) = submission_param(route) else {
            return Ok(Guard::Stop(NavigationOutcome::forbidden()));
        };
        if user.is_application_admin() {
            return Ok(Guard::Next);
        }

        let own: Vec<UserSubmission> = self
            .queries
            .current_user_submissions()
            .await?
            .into_iter()
            .filter(|s| s.submission_id == id)
            .collect();

        let context = match own.first() {
            Some(first) => {
                let direct: Vec<Role> = own.iter().map(|s| s.role).collect();
                let on_publication = self
                    .queries
                    .publication_roles(first.publication_id)
                    .await?
                    .first()
                    .copied();
                AccessContext {
                    submission_id: id,
                    status: first.status,
                    effective_role: effective_submission_role(on_publication, &direct),
                    is_application_admin: false,
                }
            }
            None if category.admits_publication_staff() => {
                let Some(summary) = self.queries.submission(id).await? else {
                    return Ok(Guard::Stop(NavigationOutcome::forbidden()));
                };
                let on_publication = self
                    .queries
                    .publication_roles(summary.publication_id)
                    .await?
                    .first()
                    .copied();
                AccessContext {
                    submission_id: id,
                    status: summary.status,
                    effective_role: effective_submission_role(on_publication, &[]),
                    is_application_admin: false,
                }
            }
            None => return Ok(Guard::Stop(NavigationOutcome::forbidden())),
        };

        Ok(match evaluate(category, &context) {
            AccessDecision::Allow => Guard::Next,
            AccessDecision::Redirect(target) => {
                Guard::Stop(NavigationOutcome::redirect(target.path()))
            }
            AccessDecision::Deny => {
                tracing::debug!(user_id = %user.id, submission_id = %id, ?category, "page denied");
                Guard::Stop(NavigationOutcome::forbidden())
            }
        })
    }
}

fn submission_param(route: &RouteMatch<'_>) -> Option<SubmissionId> {
    route
        .params
        .get("id")
        .and_then(|id| id.parse::<i64>().ok())
        .map(SubmissionId)
}

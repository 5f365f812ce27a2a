use anyhow::Context;
use axum::Router;
use axum::routing::{delete, get, post, put};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::{
    auth, comments, health_check, navigation, notifications, publications, submission_statuses,
    submissions, users,
};

mod api;
mod handlers;
mod querystring;
mod session;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        // see: https://github.com/Ptrskay3/axum-prometheus
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = router(state)
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        let address = self
            .listener
            .local_addr()
            .context("listener has no local address")?;
        tracing::info!("listening on {}", address);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

/// Health check and the API, without metrics or tracing layers.
pub(crate) fn router<S: AppState>(state: S) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route("/submission-statuses", get(submission_statuses))
        .route("/navigation", get(navigation::navigate::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", post(auth::logout::<S>))
        .route("/me", get(auth::me))
        .route("/users", post(users::register::<S>))
        .route("/users/{id}", put(users::update_user::<S>))
        .route("/email/verification/send", post(users::send_verification::<S>))
        .route("/email/verify", post(users::verify_email::<S>))
        .route(
            "/publications",
            get(publications::list_publications::<S>).post(publications::create_publication::<S>),
        )
        .route("/publications/{id}", get(publications::find_publication::<S>))
        .route(
            "/publications/{id}/users",
            get(publications::publication_users::<S>).post(publications::assign_user::<S>),
        )
        .route(
            "/publications/{id}/users/{user_id}/{role_id}",
            delete(publications::remove_user::<S>),
        )
        .route(
            "/publications/{id}/style-criteria",
            get(publications::list_style_criteria::<S>)
                .post(publications::create_style_criteria::<S>),
        )
        .route(
            "/style-criteria/{id}",
            put(publications::update_style_criteria::<S>)
                .delete(publications::delete_style_criteria::<S>),
        )
        .route(
            "/submissions",
            get(submissions::my_submissions::<S>).post(submissions::create_submission::<S>),
        )
        .route(
            "/submissions/{id}",
            get(submissions::find_submission::<S>).put(submissions::update_submission::<S>),
        )
        .route("/submissions/{id}/users", get(submissions::submission_users::<S>))
        .route("/submissions/{id}/stage", post(submissions::stage_user::<S>))
        .route(
            "/submissions/{id}/content",
            get(submissions::content_history::<S>).post(submissions::append_content::<S>),
        )
        .route(
            "/submissions/{id}/comments",
            get(comments::comment_tree::<S>).post(comments::create_comment::<S>),
        )
        .route("/comments/{id}", delete(comments::delete_comment::<S>))
        .route("/notifications", get(notifications::my_notifications::<S>))
        .route("/notifications/read", post(notifications::mark_all_read::<S>))
        .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
}

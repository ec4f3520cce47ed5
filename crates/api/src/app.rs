use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use shared::session::{SessionError, SessionKeys};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_user_auth, trace_id};
use crate::routes::{courses, export, health, invitations, participants, tags};
use crate::services::email::{EmailWorkerClient, EmailWorkerError};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub session_keys: SessionKeys,
    pub email_worker: EmailWorkerClient,
}

/// Errors building the application.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid session configuration: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to build mail worker client: {0}")]
    EmailWorker(#[from] EmailWorkerError),
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, StartupError> {
        let session_keys = SessionKeys::new(&config.session.secret, config.session.leeway_secs)?;
        let email_worker = EmailWorkerClient::new(&config.email)?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            session_keys,
            email_worker,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, StartupError> {
    let state = AppState::new(config, pool)?;
    let cors = cors_layer(&state.config);
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // Signed-in routes
    let course_routes = Router::new()
        .route("/api/v1/courses", post(courses::create_course))
        .route(
            "/api/v1/courses/:course",
            get(courses::get_course).patch(courses::update_course),
        )
        .route("/api/v1/courses/:course/archive", post(courses::archive_course))
        .route(
            "/api/v1/courses/:course/unarchive",
            post(courses::unarchive_course),
        )
        .route(
            "/api/v1/courses/:course/settings/polls",
            put(courses::update_polls_setting),
        )
        .route(
            "/api/v1/courses/:course/participants",
            get(participants::list_participants),
        )
        .route(
            "/api/v1/courses/:course/participants/:participant",
            patch(participants::update_participant)
                .delete(participants::remove_participant),
        )
        .route(
            "/api/v1/courses/:course/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/api/v1/courses/:course/invitations/:invitation/resend",
            post(invitations::resend_invitation),
        )
        .route(
            "/api/v1/courses/:course/invitations/:invitation/redeem",
            post(invitations::redeem_invitation),
        )
        .route(
            "/api/v1/courses/:course/tags",
            get(tags::list_tags).put(tags::replace_tags),
        )
        .route("/api/v1/courses/:course/export", get(export::export_course))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Anyone with the link may view an invitation; the PATCH handler
    // authenticates through its StaffContext extractor.
    let invitation_link_routes = Router::new().route(
        "/api/v1/courses/:course/invitations/:invitation",
        get(invitations::show_invitation).patch(invitations::update_invitation),
    );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let app = Router::new()
        .merge(public_routes)
        .merge(invitation_link_routes)
        .merge(course_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(app)
}

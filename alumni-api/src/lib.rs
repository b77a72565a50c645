//! alumni-api library - Alumni Directory HTTP service
//!
//! Staff-facing administrative API: search, save, and bulk-import
//! alumni contact records, manage accounts, authenticate via password
//! or Google sign-in.

use alumni_common::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod google;
pub mod import;
pub mod notify;
pub mod search;

use google::GoogleVerifier;
use notify::{LogNotifier, ResetNotifier};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Resolved service configuration
    pub config: Arc<Config>,
    /// Password-reset delivery seam
    pub notifier: Arc<dyn ResetNotifier>,
    /// ID-token verifier; None disables Google sign-in
    pub google: Option<Arc<GoogleVerifier>>,
}

impl AppState {
    /// State with the default (logging) notifier and a verifier when
    /// a Google client id is configured
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let google = config
            .google_client_id
            .clone()
            .map(|client_id| Arc::new(GoogleVerifier::new(client_id)));

        Self {
            db,
            config: Arc::new(config),
            notifier: Arc::new(LogNotifier),
            google,
        }
    }

    /// Swap the reset notifier (tests capture reset links this way)
    pub fn with_notifier(mut self, notifier: Arc<dyn ResetNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Build application router
///
/// Alumni routes are public (matching the original service); account
/// and user-management routes sit behind the bearer-token middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, patch, post};

    let protected = Router::new()
        .route("/auth/register", post(api::auth::register))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/users", get(api::users::list_users))
        .route("/auth/users/:id", delete(api::users::delete_user))
        .route("/auth/users/:id/role", patch(api::users::change_role))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(api::health::health))
        .route("/alumni/search", post(api::alumni::search_alumni))
        .route("/alumni", post(api::alumni::save_alumni))
        .route(
            "/alumni/import-excel",
            post(api::import::import_excel)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/alumni/departments", get(api::alumni::list_departments))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        .route("/auth/reset-password", post(api::auth::reset_password))
        .route("/auth/google", post(api::auth::google_signin));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

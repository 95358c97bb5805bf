pub mod health;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::middleware::authenticate;
use crate::interview::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::performance::log_performance;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Candidate admin API and resume submission require a session
    let authenticated = Router::new()
        .route(
            "/api/v1/candidates",
            get(candidates::handle_list_candidates),
        )
        .route(
            "/api/v1/candidates/export",
            get(candidates::handle_export_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handle_get_candidate).patch(candidates::handle_update_candidate),
        )
        .route(
            "/api/v1/candidates/:id/interviewers",
            patch(candidates::handle_assign_interviewers),
        )
        .route("/api/v1/resumes", post(jobs::handle_submit_resume))
        .route("/api/v1/resumes/:id", get(jobs::handle_get_resume))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Public job board
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job));

    public
        .merge(authenticated)
        .layer(middleware::from_fn_with_state(state.clone(), log_performance))
        .with_state(state)
}

/// CORS for the configured origins. A `*` entry allows any origin.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

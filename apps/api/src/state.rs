use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::directory::UserDirectory;
use crate::config::Config;
use crate::interview::store::CandidateStore;
use crate::jobs::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Job board queries go straight to the pool.
    pub db: PgPool,
    pub config: Config,
    pub candidates: Arc<dyn CandidateStore>,
    pub resumes: Arc<dyn ResumeStore>,
    pub users: Arc<dyn UserDirectory>,
}

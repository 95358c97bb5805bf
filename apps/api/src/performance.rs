use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::middleware::Caller;
use crate::state::AppState;

/// Logs method, path, status, caller and wall time of every request.
/// Requests taking `SLOW_REQUEST_MS` or longer are logged at warn.
/// Anonymous requests are logged with caller `-`.
pub async fn log_performance(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    let caller = response
        .extensions()
        .get::<Caller>()
        .map(|c| c.0.as_str())
        .unwrap_or("-");
    if elapsed_ms >= state.config.slow_request_ms {
        tracing::warn!(%method, %path, status, caller, elapsed_ms, "slow request");
    } else {
        tracing::info!(%method, %path, status, caller, elapsed_ms, "request served");
    }
    response
}

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Username of the authenticated caller, attached to the response so outer
/// layers can log who made the request.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the bearer session token and stores the caller as `Arc<CurrentUser>`
/// in the request extensions. Requests without a valid session get 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&request) else {
        tracing::warn!(path = %request.uri().path(), "missing bearer token, authentication denied");
        return Err(AppError::Unauthorized);
    };

    match state.users.find_by_token(token).await? {
        Some(user) => {
            tracing::debug!(user = %user.username, "authenticated");
            let caller = Caller(user.username.clone());
            request.extensions_mut().insert(Arc::new(user));
            let mut response = next.run(request).await;
            response.extensions_mut().insert(caller);
            Ok(response)
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "unknown or expired session token");
            Err(AppError::Unauthorized)
        }
    }
}

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Extension type holding the directory record of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Middleware gating every protected route.
///
/// Extracts the bearer token, verifies it, and re-resolves its subject
/// against the directory. On success the caller's `User` is added to the
/// request extensions; every rejection is a 401 with a Bearer challenge.
pub async fn authorize<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())
        .map_err(|e| {
            tracing::warn!(uri = %req.uri(), "Missing or malformed Authorization header");
            e
        })?
        .to_string();

    let user = state.auth_service.authorize(&token).await?;

    tracing::debug!(user_id = %user.id, username = %user.username, "Request authorized");
    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// # Errors
/// * `MalformedCarrier` - Header missing, not ASCII, wrong scheme, or not exactly two parts
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MalformedCarrier)?
        .to_str()
        .map_err(|_| AuthError::MalformedCarrier)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedCarrier),
    }
}

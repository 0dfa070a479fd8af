use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::middleware::extract_bearer_token;
use crate::inbound::http::router::AppState;

/// OAuth2 password-grant style token endpoint.
///
/// A username/password form takes precedence. Without one, a currently
/// valid bearer token in `Authorization` is exchanged for a fresh token.
pub async fn issue_token<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    headers: HeaderMap,
    form: Option<Form<TokenRequest>>,
) -> Result<Json<TokenResponseData>, ApiError> {
    let credentials = form.and_then(|Form(request)| request.credentials());

    let access_token = match credentials {
        Some((username, password)) => state.auth_service.login(&username, &password).await?,
        None if headers.contains_key(header::AUTHORIZATION) => {
            let token = extract_bearer_token(&headers)?;
            state.auth_service.reissue(token).await?
        }
        None => return Err(ApiError::BadRequest("Invalid authentication data".to_string())),
    };

    Ok(Json(access_token.into()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenRequest {
    username: Option<String>,
    password: Option<String>,
}

impl TokenRequest {
    fn credentials(self) -> Option<(String, String)> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<AccessToken> for TokenResponseData {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.value,
            token_type: "bearer",
            expires_in: token.expires_in,
        }
    }
}

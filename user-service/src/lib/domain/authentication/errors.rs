use thiserror::Error;

/// Terminal outcomes of a login or an authorization check.
///
/// Display strings are what clients see, so they stay generic: an expired
/// token and a forged one both read "Invalid token".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    MalformedCarrier,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid authentication credentials")]
    IdentityNotFound,

    #[error("Directory lookup failed: {0}")]
    Directory(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),
}

use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::user::models::User;

/// Port for credential checks and token lifecycle.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange a username and password for a bearer token.
    ///
    /// # Arguments
    /// * `username` - Raw username as submitted
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Token whose subject is the username
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password
    /// * `Directory` - User lookup failed
    /// * `TokenIssuance` - Token could not be signed
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError>;

    /// Verify a bearer token and resolve its subject to a directory record.
    ///
    /// The record is fetched on every call.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, forged, or expired
    /// * `IdentityNotFound` - Subject is missing or no longer in the directory
    /// * `Directory` - User lookup failed
    async fn authorize(&self, token: &str) -> Result<User, AuthError>;

    /// Issue a new token for the holder of a currently valid one.
    ///
    /// # Errors
    /// * Everything `authorize` can return
    /// * `TokenIssuance` - Token could not be signed
    async fn reissue(&self, token: &str) -> Result<AccessToken, AuthError>;
}

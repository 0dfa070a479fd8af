/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,

    /// Seconds until the token expires
    pub expires_in: i64,
}

impl From<auth::AuthenticationResult> for AccessToken {
    fn from(result: auth::AuthenticationResult) -> Self {
        Self {
            value: result.access_token,
            expires_in: result.expires_in,
        }
    }
}

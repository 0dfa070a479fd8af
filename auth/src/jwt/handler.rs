use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;
use super::settings::TokenSettings;

/// JWT token handler for issuing and verifying bearer tokens.
///
/// Signs with the secret and HMAC algorithm from [`TokenSettings`].
/// Verification requires an `exp` claim and applies no clock leeway.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler from signing settings.
    ///
    /// # Arguments
    /// * `settings` - Secret, algorithm, and default token lifetime
    ///
    /// # Returns
    /// JwtHandler instance
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret()),
            decoding_key: DecodingKey::from_secret(settings.secret()),
            algorithm: settings.algorithm(),
            default_ttl: settings.default_ttl(),
        }
    }

    /// Lifetime applied when `issue` is called without a TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a signed token expiring `ttl` from now.
    ///
    /// Caller claims are kept; `iat` and `exp` are overwritten.
    ///
    /// # Arguments
    /// * `claims` - Claims to sign; should carry a subject
    /// * `ttl` - Token lifetime, or `None` for the configured default
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, claims: Claims, ttl: Option<Duration>) -> Result<String, JwtError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Issue a signed token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        claims: Claims,
        ttl: Option<Duration>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let expires_at = issued_at + ttl.unwrap_or(self.default_ttl);
        let claims = claims
            .with_issued_at(issued_at.timestamp())
            .with_expiration(expires_at.timestamp());

        self.encode(&claims)
    }

    /// Encode claims into a JWT token as-is.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a token, verifying signature, algorithm, and expiry.
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, forged, signed with another
    ///   algorithm, missing `exp`, or expired
    pub fn parse_and_verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Token verification failed");
                JwtError::InvalidToken
            })
    }
}

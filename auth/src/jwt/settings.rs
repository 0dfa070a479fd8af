use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;

use super::errors::JwtError;

/// Default lifetime of an access token when the caller does not pick one.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// Immutable signing configuration shared by token issuance and verification.
///
/// Built once at startup. Issuing and verifying with different settings
/// makes every previously issued token unverifiable.
#[derive(Clone)]
pub struct TokenSettings {
    secret: Vec<u8>,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenSettings {
    /// Create settings for an HMAC signing algorithm.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret
    /// * `algorithm` - One of HS256, HS384, HS512
    ///
    /// # Errors
    /// * `EmptySecret` - Secret has no bytes
    /// * `UnsupportedAlgorithm` - Algorithm is not HMAC based
    pub fn new(secret: impl Into<Vec<u8>>, algorithm: Algorithm) -> Result<Self, JwtError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        Ok(Self {
            secret,
            algorithm,
            default_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
        })
    }

    /// Create settings from an algorithm name such as `"HS256"`.
    pub fn from_algorithm_name(secret: impl Into<Vec<u8>>, algorithm: &str) -> Result<Self, JwtError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;
        Self::new(secret, algorithm)
    }

    /// Override the TTL used when a token is issued without an explicit one.
    ///
    /// # Errors
    /// * `NonPositiveTtl` - TTL is zero or negative
    pub fn with_default_ttl(mut self, ttl: Duration) -> Result<Self, JwtError> {
        if ttl <= Duration::zero() {
            return Err(JwtError::NonPositiveTtl(ttl.num_seconds()));
        }
        self.default_ttl = ttl;
        Ok(self)
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

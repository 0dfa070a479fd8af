//! Authentication primitives for the user service.
//!
//! - Password hashing (Argon2id)
//! - Bearer token issuance and verification (HMAC-signed JWT)
//! - Authentication coordination
//!
//! The crate knows nothing about users or storage: services look up the
//! stored credential themselves and hand it to [`Authenticator`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Algorithm, Claims, JwtHandler, TokenSettings};
//!
//! let settings = TokenSettings::new(b"secret_key_at_least_32_bytes_long!".to_vec(), Algorithm::HS256).unwrap();
//! let handler = JwtHandler::new(&settings);
//! let token = handler.issue(Claims::for_subject("alice"), None).unwrap();
//! let decoded = handler.parse_and_verify(&token).unwrap();
//! assert_eq!(decoded.subject(), Some("alice"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Claims, TokenSettings};
//!
//! let settings = TokenSettings::from_algorithm_name("secret_key_at_least_32_bytes_long!", "HS256").unwrap();
//! let auth = Authenticator::new(&settings);
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, Claims::for_subject("alice")).unwrap();
//!
//! // Validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.subject(), Some("alice"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenSettings;
pub use jwt::settings::DEFAULT_ACCESS_TOKEN_TTL_MINUTES;
pub use jsonwebtoken::Algorithm;
pub use password::PasswordError;
pub use password::PasswordHasher;

//! Authentication primitives library
//!
//! Provides the credential and token building blocks used by the account service:
//! - Password hashing (Argon2id)
//! - Password strength policy
//! - Access/refresh JWT pairs (HS256) with typed claims
//! - Authentication coordination
//!
//! Nothing in this crate performs I/O. Token revocation (the denylist) is a storage
//! concern and lives with the service that persists it.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Password Policy
//! ```
//! use auth::PasswordPolicy;
//!
//! let policy = PasswordPolicy::default();
//! assert!(policy.validate("StrongPass#2026", "owner@example.com").is_ok());
//! assert!(policy.validate("12345678", "owner@example.com").is_err());
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenIssuer, TokenLifetimes, TokenType};
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", TokenLifetimes::default());
//! let pair = issuer.issue_pair("user123").unwrap();
//! let claims = issuer.verify(&pair.refresh.token, TokenType::Refresh).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("user123"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenLifetimes, TokenType};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", TokenLifetimes::default());
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify the password, then issue a token pair
//! auth.verify_credentials("password123", &hash).unwrap();
//! let tokens = auth.issue_tokens("user123").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&tokens.access.token, TokenType::Access).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("user123"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::IssuedPair;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenIssuer;
pub use jwt::TokenLifetimes;
pub use jwt::TokenType;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use password::PolicyViolation;

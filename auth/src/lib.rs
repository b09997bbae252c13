//! Credential core
//!
//! Issues, signs and verifies time-bounded bearer tokens for authenticated
//! users, and hashes passwords for storage:
//! - Password hashing (bcrypt, configurable cost)
//! - Token issuance (HS256 JWT, valid from one hour ago for 60 days)
//! - Token verification (algorithm, signature, issuer and validity window,
//!   then subject resolution through [`IdentityLookup`])
//!
//! User storage, HTTP routing and configuration sources live outside this
//! crate. Everything here is built from one immutable [`SigningConfig`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use authcore::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(4);
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.matches("my_password", &hash).is_ok());
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//!
//! use authcore::{SigningConfig, TokenIssuer, TokenVerifier, UserId};
//!
//! let secret = b"secret_key_at_least_32_bytes_long!".to_vec();
//! let config = Arc::new(SigningConfig::new(4, "trackit", secret).unwrap());
//! let issuer = TokenIssuer::new(Arc::clone(&config));
//! let verifier = TokenVerifier::new(config);
//!
//! let token = issuer.issue(&UserId(42)).unwrap();
//! let claims = verifier.decode(&token).unwrap();
//! assert_eq!(claims.sub, UserId(42));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::sync::Arc;
//!
//! use authcore::{Authenticator, SigningConfig, UserId};
//!
//! let secret = b"secret_key_at_least_32_bytes_long!".to_vec();
//! let config = SigningConfig::new(4, "trackit", secret).unwrap();
//! let auth = Authenticator::new(Arc::new(config));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, &UserId(42)).unwrap();
//! println!("Token: {}", result.access_token);
//! ```

pub mod authenticator;
pub mod config;
pub mod identity;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use crate::config::ConfigError;
pub use crate::config::SigningConfig;
pub use identity::Identity;
pub use identity::IdentityLookup;
pub use identity::IdentityLookupError;
pub use identity::UserId;
pub use jwt::bearer_token;
pub use jwt::Claims;
pub use jwt::ClaimsViolation;
pub use jwt::JwtError;
pub use jwt::SigningAlgorithm;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;

use std::sync::Arc;

use crate::config::SigningConfig;
use crate::identity::Identity;
use crate::identity::IdentityLookup;
use crate::identity::UserId;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password checks and token handling.
///
/// Built once from the signing configuration and shared between request
/// handlers; holds no mutable state.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_verifier: TokenVerifier,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,

    /// User the token was issued for
    pub user_id: UserId,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `config` - Signing configuration loaded at startup
    pub fn new(config: Arc<SigningConfig>) -> Self {
        Self {
            password_hasher: PasswordHasher::from_config(&config),
            token_issuer: TokenIssuer::new(Arc::clone(&config)),
            token_verifier: TokenVerifier::new(config),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to check
    /// * `stored_hash` - Stored password hash
    /// * `identity` - User logging in
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token signing failed
    pub fn authenticate<I: Identity + ?Sized>(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &I,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let user_id = identity.id();

        match self.password_hasher.matches(password, stored_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                tracing::info!(user_id = %user_id, "Login rejected: password mismatch");
                return Err(AuthenticationError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Login failed: stored hash unusable"
                );
                return Err(e.into());
            }
        }

        let access_token = self.token_issuer.issue(identity)?;

        Ok(AuthenticationResult {
            access_token,
            user_id,
        })
    }

    /// Issue a token without password verification.
    ///
    /// For callers that have already authenticated the user by other means.
    pub fn generate_token<I: Identity + ?Sized>(&self, identity: &I) -> Result<String, JwtError> {
        self.token_issuer.issue(identity)
    }

    /// Authenticate a bearer token and resolve its user.
    pub async fn authenticate_token<L: IdentityLookup>(
        &self,
        token: &str,
        lookup: &L,
    ) -> Result<L::Identity, JwtError> {
        self.token_verifier.verify(token, lookup).await
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.token_issuer
    }

    pub fn token_verifier(&self) -> &TokenVerifier {
        &self.token_verifier
    }
}

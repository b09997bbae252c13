use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::algorithm::SigningAlgorithm;
use super::claims::Claims;
use super::errors::JwtError;
use crate::config::SigningConfig;
use crate::identity::Identity;

/// Mints signed credentials.
///
/// Tokens are HS256 JWTs keyed by the configured secret. They depend on the
/// mint time, so two calls for the same identity produce different tokens.
pub struct TokenIssuer {
    config: Arc<SigningConfig>,
    encoding_key: EncodingKey,
    algorithm: SigningAlgorithm,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `config` - Shared signing configuration
    pub fn new(config: Arc<SigningConfig>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            config,
            algorithm: SigningAlgorithm::Hs256,
        }
    }

    /// Issue a token for an identity, valid from one hour ago for 60 days.
    ///
    /// # Errors
    /// * `Signing` - Token signing failed
    pub fn issue<I: Identity + ?Sized>(&self, identity: &I) -> Result<String, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if minted at `now`.
    pub fn issue_at<I: Identity + ?Sized>(
        &self,
        identity: &I,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_identity(identity, self.config.issuer(), now);
        let token = self.sign(&claims)?;

        tracing::debug!(
            user_id = %claims.sub,
            not_before = claims.nbf,
            expires_at = claims.exp,
            "Token issued"
        );

        Ok(token)
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    /// * `Signing` - Token signing failed
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm.to_jsonwebtoken());

        encode(&header, claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            JwtError::Signing(e.to_string())
        })
    }
}

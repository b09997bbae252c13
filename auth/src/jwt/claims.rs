use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::ClaimsViolation;
use crate::identity::Identity;
use crate::identity::UserId;

/// How far `nbf` is backdated from mint time, to absorb clock skew.
pub const NOT_BEFORE_GRACE_SECONDS: i64 = 60 * 60;

/// Token lifetime from mint time (60 days).
pub const TOKEN_LIFETIME_SECONDS: i64 = 60 * 24 * 60 * 60;

/// Claims carried by every credential.
///
/// Serialized as `{"iss": .., "nbf": .., "exp": .., "sub": ..}` with unix
/// timestamps in seconds and an integer subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Subject (user identifier)
    pub sub: UserId,
}

impl Claims {
    /// Create claims for an identity minted at `now`.
    ///
    /// # Arguments
    /// * `identity` - User the token is bound to
    /// * `issuer` - Configured issuer identity
    /// * `now` - Mint time
    ///
    /// # Returns
    /// Claims valid from `now - 1h` until `now + 60d`
    pub fn for_identity<I: Identity + ?Sized>(
        identity: &I,
        issuer: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let not_before = now - Duration::seconds(NOT_BEFORE_GRACE_SECONDS);
        let expiration = now + Duration::seconds(TOKEN_LIFETIME_SECONDS);

        Self {
            iss: issuer.to_string(),
            nbf: not_before.timestamp(),
            exp: expiration.timestamp(),
            sub: identity.id(),
        }
    }

    pub fn subject(&self) -> UserId {
        self.sub
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Check if token has reached its activation time.
    pub fn is_active(&self, current_timestamp: i64) -> bool {
        self.nbf <= current_timestamp
    }

    /// Validate issuer and validity window.
    ///
    /// Checks run in order issuer, activation, expiry; the first violation is
    /// reported.
    pub fn validate(&self, issuer: &str, current_timestamp: i64) -> Result<(), ClaimsViolation> {
        if self.iss != issuer {
            return Err(ClaimsViolation::IssuerMismatch);
        }
        if !self.is_active(current_timestamp) {
            return Err(ClaimsViolation::NotYetValid);
        }
        if self.is_expired(current_timestamp) {
            return Err(ClaimsViolation::Expired);
        }
        Ok(())
    }
}

use thiserror::Error;

use crate::identity::IdentityLookupError;

/// Error type for JWT operations.
///
/// Messages never include the signing secret or the token itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Failed to parse token: {0}")]
    Parse(String),

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token claims are invalid: {0}")]
    ClaimsInvalid(ClaimsViolation),

    #[error("Failed to resolve token subject: {0}")]
    IdentityResolution(#[source] IdentityLookupError),
}

impl JwtError {
    /// Whether the failure means the caller presented a bad credential, as
    /// opposed to user storage being unreachable.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(
            self,
            JwtError::Signing(_)
                | JwtError::IdentityResolution(IdentityLookupError::Unavailable(_))
        )
    }
}

/// Reason a correctly signed token was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ClaimsViolation {
    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("token expired")]
    Expired,
}

impl ClaimsViolation {
    /// Stable label for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimsViolation::IssuerMismatch => "issuer_mismatch",
            ClaimsViolation::NotYetValid => "not_yet_valid",
            ClaimsViolation::Expired => "expired",
        }
    }
}

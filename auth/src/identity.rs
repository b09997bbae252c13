use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// User unique identifier, carried as the token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Anything a token can be minted for.
///
/// The user entity itself is owned by the user storage component; this crate
/// only needs its identifier.
pub trait Identity {
    fn id(&self) -> UserId;
}

impl Identity for UserId {
    fn id(&self) -> UserId {
        *self
    }
}

/// Error returned by the user lookup collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityLookupError {
    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error("User storage unavailable: {0}")]
    Unavailable(String),
}

/// Port to the user storage component, used to resolve a verified token
/// subject back to a user.
#[async_trait]
pub trait IdentityLookup: Send + Sync + 'static {
    type Identity: Identity + Send;

    /// Retrieve user by identifier.
    ///
    /// # Arguments
    /// * `id` - Subject of a verified token
    ///
    /// # Returns
    /// The user entity
    ///
    /// # Errors
    /// * `NotFound` - No user with this identifier
    /// * `Unavailable` - Storage could not be reached
    async fn lookup_identity_by_id(
        &self,
        id: UserId,
    ) -> Result<Self::Identity, IdentityLookupError>;
}

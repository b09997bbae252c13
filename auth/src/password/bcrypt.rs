use bcrypt::BcryptError;

use super::errors::PasswordError;
use crate::config::SigningConfig;

/// Longest password bcrypt hashes without silently truncating it.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Password hashing implementation.
///
/// Provides adaptive password hashing (internally uses bcrypt). The work
/// factor comes from the signing configuration.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a password hasher with an explicit work factor.
    ///
    /// The cost is checked by bcrypt on every call, not here.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Create a password hasher using the configured work factor.
    pub fn from_config(config: &SigningConfig) -> Self {
        Self::new(config.hash_cost())
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses bcrypt with a random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Modular crypt string (`$2b$<cost>$<salt><digest>`)
    ///
    /// # Errors
    /// * `Hashing` - Empty or over-long password, or cost rejected by bcrypt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Hashing("password is empty".to_string()));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::Hashing(format!(
                "password longer than {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::Hashing(describe(&e)))
    }

    /// Check a password against a stored hash.
    ///
    /// The digest comparison is constant time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to check
    /// * `hash` - Stored hash in modular crypt format
    ///
    /// # Errors
    /// * `Mismatch` - Password does not correspond to the hash
    /// * `MalformedHash` - Hash is not a bcrypt string
    pub fn matches(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let is_valid = bcrypt::verify(password, hash)
            .map_err(|e| PasswordError::MalformedHash(describe(&e)))?;

        // bcrypt only reads the first 72 bytes; anything longer was never hashed by us.
        if is_valid && password.len() <= MAX_PASSWORD_BYTES {
            Ok(())
        } else {
            Err(PasswordError::Mismatch)
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

/// Error text without echoing the hash or password back.
fn describe(error: &BcryptError) -> String {
    match error {
        BcryptError::InvalidHash(_) => "unexpected hash layout".to_string(),
        BcryptError::InvalidPrefix(prefix) => format!("unsupported prefix {}", prefix),
        BcryptError::InvalidCost(_) => "unreadable cost".to_string(),
        BcryptError::InvalidBase64(_) => "salt or digest is not valid base64".to_string(),
        other => other.to_string(),
    }
}

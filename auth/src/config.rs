use std::env;
use std::fmt;
use std::path::Path;

use config::Config as ConfigBuilder;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

/// Lowest work factor bcrypt accepts.
pub const MIN_HASH_COST: u32 = 4;

/// Highest work factor bcrypt accepts.
pub const MAX_HASH_COST: u32 = 31;

/// Work factor used when the configuration leaves `hash_cost` unset.
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Prefix of the environment variables read by `SigningConfig::load`.
pub const ENV_PREFIX: &str = "AUTH";

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Hash cost out of range: expected {min}..={max}, got {actual}")]
    HashCostOutOfRange { min: u32, max: u32, actual: u32 },

    #[error("Issuer must not be empty")]
    EmptyIssuer,

    #[error("Signing secret must not be empty")]
    EmptySecret,
}

#[derive(Deserialize)]
struct AuthSettings {
    #[serde(default = "default_hash_cost")]
    hash_cost: u32,
    issuer: String,
    secret: String,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("hash_cost", &self.hash_cost)
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn default_hash_cost() -> u32 {
    DEFAULT_HASH_COST
}

/// Process-wide signing configuration.
///
/// Built once at startup and shared read-only (usually behind an `Arc`) by the
/// password hasher, token issuer and token verifier. The secret never shows up
/// in `Debug` output.
#[derive(Clone)]
pub struct SigningConfig {
    hash_cost: u32,
    issuer: String,
    secret: Vec<u8>,
}

impl SigningConfig {
    /// Build a validated configuration.
    ///
    /// # Arguments
    /// * `hash_cost` - bcrypt work factor (4..=31)
    /// * `issuer` - Identity asserted by and checked against every token
    /// * `secret` - Symmetric signing key
    ///
    /// # Errors
    /// * `HashCostOutOfRange` - Cost outside bcrypt bounds
    /// * `EmptyIssuer` - Issuer is empty
    /// * `EmptySecret` - Secret is empty
    pub fn new(
        hash_cost: u32,
        issuer: impl Into<String>,
        secret: impl Into<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        let secret = secret.into();

        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&hash_cost) {
            return Err(ConfigError::HashCostOutOfRange {
                min: MIN_HASH_COST,
                max: MAX_HASH_COST,
                actual: hash_cost,
            });
        }
        if issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        Ok(Self {
            hash_cost,
            issuer,
            secret,
        })
    }

    /// Load configuration from `./config` with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__SECRET, AUTH__ISSUER, AUTH__HASH_COST)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same layering as [`SigningConfig::load`], reading files from `directory`.
    pub fn load_from(directory: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let directory = directory.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::from(directory.join("default")).required(false))
            .add_source(File::from(directory.join(run_mode)).required(false))
            // AUTH__SECRET=... overrides secret
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_settings(configuration)
    }

    /// Validate an already assembled `config::Config`.
    ///
    /// Expects top-level `issuer`, `secret` and optionally `hash_cost`.
    pub fn from_settings(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let settings: AuthSettings = configuration.try_deserialize()?;

        Self::new(
            settings.hash_cost,
            settings.issuer,
            settings.secret.into_bytes(),
        )
    }

    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("hash_cost", &self.hash_cost)
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .finish()
    }
}

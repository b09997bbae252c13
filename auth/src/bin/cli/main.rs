use std::sync::Arc;

use async_trait::async_trait;
use authcore::Authenticator;
use authcore::IdentityLookup;
use authcore::IdentityLookupError;
use authcore::PasswordHasher;
use authcore::SigningConfig;
use authcore::UserId;
use chrono::Utc;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Operator tool for password hashes and access tokens
#[derive(Parser, Debug)]
#[command(name = "authcore")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    AUTH__SECRET       Token signing secret (required)
    AUTH__ISSUER       Token issuer (default from config/default.toml)
    AUTH__HASH_COST    bcrypt cost, 4..=31
    RUN_MODE           Selects config/{RUN_MODE}.toml (default: development)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password for storage
    Hash {
        /// Plaintext password
        password: String,
    },
    /// Check a password against a stored hash
    Check {
        /// Plaintext password
        password: String,
        /// Stored bcrypt hash
        hash: String,
    },
    /// Issue an access token for a user id
    Issue {
        /// User identifier (token subject)
        user_id: i64,
    },
    /// Verify an access token and print its claims
    Verify {
        /// Access token, optionally prefixed with "Bearer "
        token: String,
    },
}

/// Resolves every subject to itself; there is no user store behind the CLI.
struct SubjectEcho;

#[async_trait]
impl IdentityLookup for SubjectEcho {
    type Identity = UserId;

    async fn lookup_identity_by_id(&self, id: UserId) -> Result<UserId, IdentityLookupError> {
        Ok(id)
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authcore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Arc::new(SigningConfig::load()?);
    tracing::debug!(
        issuer = %config.issuer(),
        hash_cost = config.hash_cost(),
        "Configuration loaded"
    );

    let authenticator = Authenticator::new(Arc::clone(&config));

    match cli.command {
        Command::Hash { password } => {
            println!("{}", authenticator.hash_password(&password)?);
        }
        Command::Check { password, hash } => {
            PasswordHasher::from_config(&config).matches(&password, &hash)?;
            println!("match");
        }
        Command::Issue { user_id } => {
            println!("{}", authenticator.generate_token(&UserId(user_id))?);
        }
        Command::Verify { token } => {
            let token = authcore::bearer_token(&token).unwrap_or(token.trim());
            let claims = authenticator
                .token_verifier()
                .decode_at(token, Utc::now())?;
            let user_id = SubjectEcho.lookup_identity_by_id(claims.sub).await?;

            tracing::info!(user_id = %user_id, "Token verified");
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }

    Ok(())
}

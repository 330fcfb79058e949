//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use tracing::Level;

/// Cookie secret used when running locally without `COOKIE_SECRET`
const DEVELOPMENT_COOKIE_SECRET: &str = "marriage-dao-development-cookie-secret";

/// Default nonce lifetime: 10 minutes
const DEFAULT_NONCE_TTL_SECS: u64 = 10 * 60;

/// Default World ID developer portal host
const DEFAULT_WORLD_ID_VERIFIER_URL: &str = "https://developer.worldcoin.org";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development {
        /// Optional override for the nonce lifetime in seconds
        nonce_ttl_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let nonce_ttl_override = env::var("NONCE_TTL_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development { nonce_ttl_override }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// World ID application identifier (`app_...`)
    ///
    /// Not required at startup: `/v1/verify` answers a missing or malformed
    /// value with a 500 so the other routes keep working.
    #[must_use]
    pub fn world_app_id(&self) -> Option<String> {
        env::var("WORLD_APP_ID")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
    }

    /// Secret used to sign the nonce cookie
    ///
    /// # Panics
    ///
    /// Panics if the `COOKIE_SECRET` environment variable is not set in production/staging
    #[must_use]
    pub fn cookie_secret(&self) -> Vec<u8> {
        match self {
            Self::Production | Self::Staging => env::var("COOKIE_SECRET")
                .expect("COOKIE_SECRET environment variable is not set")
                .into_bytes(),
            Self::Development { .. } => env::var("COOKIE_SECRET")
                .unwrap_or_else(|_| DEVELOPMENT_COOKIE_SECRET.to_string())
                .into_bytes(),
        }
    }

    /// Redis connection string for the nonce store, in-memory store when unset
    #[must_use]
    pub fn redis_url(&self) -> Option<String> {
        env::var("REDIS_URL").ok().filter(|val| !val.is_empty())
    }

    /// Worldchain RPC endpoint used for ERC-1271 signature checks
    #[must_use]
    pub fn worldchain_rpc_url(&self) -> String {
        env::var("WORLDCHAIN_RPC_URL")
            .unwrap_or_else(|_| worldchain::WORLDCHAIN_PUBLIC_RPC_URL.to_string())
    }

    /// Base URL of the World ID cloud verifier
    #[must_use]
    pub fn world_id_verifier_url(&self) -> String {
        env::var("WORLD_ID_VERIFIER_URL")
            .unwrap_or_else(|_| DEFAULT_WORLD_ID_VERIFIER_URL.to_string())
    }

    /// Lifetime of an issued nonce and of its cookie
    #[must_use]
    pub fn nonce_ttl(&self) -> Duration {
        match self {
            Self::Production | Self::Staging => Duration::from_secs(DEFAULT_NONCE_TTL_SECS),
            Self::Development { nonce_ttl_override } => {
                Duration::from_secs(nonce_ttl_override.unwrap_or(DEFAULT_NONCE_TTL_SECS))
            }
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

//! Application configuration loading from environment variables.
//!
//! All configuration is read once at startup (after `dotenvy` has populated
//! the environment from an optional `.env` file).
//!
//! # Environment Variables
//!
//! ## Required Variables
//! - `JWT_SECRET`: Secret key used to verify shopper and admin tokens
//! - `DATABASE_URL`: PostgreSQL connection string (only when `REVIEW_STORE=postgres`)
//!
//! ## Optional Variables
//! - `RUST_LOG`: Logging level (default: "info,reviews_api=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 3000)
//! - `REVIEW_STORE`: `postgres` or `memory` (default: "postgres")
//! - `DATABASE_MAX_CONNECTIONS`: DB pool size (default: 20)
//! - `IGNORE_MISSING_MIGRATIONS`: Skip missing migrations (default: true)
//! - `REQUIRE_APPROVAL`: Only approved reviews count toward ratings (default: false)
//! - `APPROVE_NEW_REVIEWS`: New reviews start out approved (default: false)
//! - `ORDERS_API_URL`: Base URL of the order history API
//! - `ORDERS_API_TOKEN`: Bearer token for the order history API
//! - `ORDERS_API_TIMEOUT_SECONDS`: HTTP timeout for order lookups (default: 10)
//! - `STORE_CALL_TIMEOUT_MS`: Deadline per store/collaborator call (default: 5000)
//! - `PURCHASE_CHECK_CONCURRENCY`: Orders checked in parallel (default: 4)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins (default: none)

use serde::Deserialize;
use std::str::FromStr;

/// Where reviews are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    /// Process-local store; ids restart from one on every boot
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown review store '{}'", other)),
        }
    }
}

/// Complete server configuration loaded from environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    pub review_store: StoreBackend,

    /// PostgreSQL connection string; unused by the memory store
    pub database_url: Option<String>,

    /// Maximum number of concurrent database connections
    pub database_max_connections: u32,

    /// Skip missing migrations during startup
    pub ignore_missing_migrations: bool,

    /// Secret key for JWT verification
    pub jwt_secret: String,

    /// Ratings only count approved reviews
    pub require_approval: bool,

    /// Default approval state of newly created reviews
    pub approve_new_reviews: bool,

    pub orders_api_url: Option<String>,
    pub orders_api_token: Option<String>,
    pub orders_api_timeout_seconds: u64,

    /// Deadline applied to every review store and collaborator call
    pub store_call_timeout_ms: u64,

    /// Upper bound on order lookups running at once per verification
    pub purchase_check_concurrency: usize,

    /// CORS allow-list; empty disables cross-origin access
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a set variable
    /// cannot be parsed to the expected type.
    pub fn from_env() -> anyhow::Result<Self> {
        let review_store: StoreBackend = env_or("REVIEW_STORE", StoreBackend::Postgres)?;
        let database_url = match review_store {
            StoreBackend::Postgres => Some(env_required("DATABASE_URL")?),
            StoreBackend::Memory => env_optional("DATABASE_URL"),
        };

        Ok(Self {
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 3000)?,
            review_store,
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 20)?,
            ignore_missing_migrations: env_or("IGNORE_MISSING_MIGRATIONS", true)?,
            jwt_secret: env_required("JWT_SECRET")?,
            require_approval: env_or("REQUIRE_APPROVAL", false)?,
            approve_new_reviews: env_or("APPROVE_NEW_REVIEWS", false)?,
            orders_api_url: env_optional("ORDERS_API_URL"),
            orders_api_token: env_optional("ORDERS_API_TOKEN"),
            orders_api_timeout_seconds: env_or("ORDERS_API_TIMEOUT_SECONDS", 10)?,
            store_call_timeout_ms: env_or("STORE_CALL_TIMEOUT_MS", 5000)?,
            purchase_check_concurrency: env_or("PURCHASE_CHECK_CONCURRENCY", 4)?,
            allowed_origins: env_optional("ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_default(),
        })
    }
}

/// Load a required environment variable.
///
/// # Errors
///
/// Returns an error if the variable is not set.
fn env_required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("Missing required environment variable: {}", key))
}

/// Set and non-blank, or `None`.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Load an environment variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

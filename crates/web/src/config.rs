//! Web server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QAIMA_DATABASE_URL` - `PostgreSQL` connection string, or `memory:` for
//!   the in-process store (falls back to `DATABASE_URL`)
//! - `QAIMA_TOKEN_SECRET` - Admin token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `QAIMA_HOST` - Bind address (default: 127.0.0.1)
//! - `QAIMA_PORT` - Listen port (default: 3000)
//! - `QAIMA_TOKEN_TTL_SECS` - Admin token lifetime (default: 43200)
//! - `QAIMA_CACHE_CAPACITY` - Maximum cached entries (default: 1000)
//! - `QAIMA_SEED_ON_STARTUP` - Write default data into an empty store (default: true)
//! - `QAIMA_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::auth::DEFAULT_TOKEN_TTL;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Substrings that mark a secret as copied from a template (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Why the configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Store connection URL (may contain a password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Admin token signing secret
    pub token_secret: SecretString,
    /// Admin token lifetime
    pub token_ttl: Duration,
    /// Maximum number of cached entries
    pub cache_capacity: u64,
    /// Write default data into an empty store at startup
    pub seed_on_startup: bool,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Read the configuration, loading a `.env` file first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing or unparsable variable, or a
    /// token secret that is short, a placeholder, or low in entropy.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = get_database_url("QAIMA_DATABASE_URL")?;
        let host: IpAddr = parse_env_or_default("QAIMA_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("QAIMA_PORT", "3000")?;

        let token_secret = get_signing_secret("QAIMA_TOKEN_SECRET")?;
        let default_ttl = DEFAULT_TOKEN_TTL.as_secs().to_string();
        let token_ttl = Duration::from_secs(parse_env_or_default(
            "QAIMA_TOKEN_TTL_SECS",
            &default_ttl,
        )?);
        if token_ttl.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "QAIMA_TOKEN_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let cache_capacity = parse_env_or_default(
            "QAIMA_CACHE_CAPACITY",
            &DEFAULT_CACHE_CAPACITY.to_string(),
        )?;
        let seed_on_startup = get_bool_env("QAIMA_SEED_ON_STARTUP", true)?;
        let log_json = get_bool_env("QAIMA_LOG_JSON", false)?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl,
            cache_capacity,
            seed_on_startup,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Environment access
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// Public so the CLI resolves the store the same way the server does.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    [primary_key, "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// A set, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_optional_env(key);
    raw.as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`1`/`0`, `true`/`false`, `yes`/`no`).
fn get_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_bool(&value)
        .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {value}")))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a Sentry sample rate and check it is within 0.0-1.0.
fn parse_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

// =============================================================================
// Secret checks
// =============================================================================

/// Bits of information per character, from the character frequencies.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Why `secret` is unfit for signing, if it is.
fn secret_weakness(secret: &str) -> Option<String> {
    let length = secret.chars().count();
    if length < MIN_TOKEN_SECRET_LENGTH {
        return Some(format!(
            "must be at least {MIN_TOKEN_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Some(format!("looks like a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    (entropy < MIN_ENTROPY_BITS_PER_CHAR).then(|| {
        format!(
            "entropy too low ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
        )
    })
}

/// Read a required signing secret and reject weak values.
fn get_signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if let Some(reason) = secret_weakness(&value) {
        return Err(ConfigError::InsecureSecret(key.to_string(), reason));
    }
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("zzzzzz").abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < 1e-9);
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_secret_weakness() {
        assert!(secret_weakness("k9X2mQ7v").unwrap().contains("at least 32"));
        assert!(
            secret_weakness("changeme-changeme-changeme-changeme")
                .unwrap()
                .contains("placeholder")
        );
        assert!(secret_weakness(&"ab".repeat(20)).unwrap().contains("entropy"));
        assert_eq!(secret_weakness("k9X2mQ7vR4tY8wZ1nB5cL3hJ6fD0sA9e"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default_token_ttl_is_twelve_hours() {
        assert_eq!(DEFAULT_TOKEN_TTL.as_secs(), 43_200);
    }
}

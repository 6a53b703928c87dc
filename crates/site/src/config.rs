//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SESSION_SECRET` - Key material for CSRF tokens (min 32 chars; high entropy in production)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` / `PORT` - Listen port (default: 3000)
//! - `APP_ENV` / `NODE_ENV` - `production` enables secure cookies and strict bootstrap
//! - `ADMIN_USERNAME`, `ADMIN_PASSWORD` - First admin (required in production when none exists)
//! - `UPLOADS_ROOT` - Public static root holding `uploads/` (default: public)
//! - `FACEBOOK_URL`, `TWITTER_URL`, `INSTAGRAM_URL`, `LINKEDIN_URL` - Footer social links
//! - `HERO_SWEEP_INTERVAL_SECS` - Hero image expiry sweep period (default: 21600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_HERO_SWEEP_SECS: u64 = 6 * 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
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

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Credentials for the admin created on first boot.
#[derive(Clone, Default)]
pub struct AdminBootstrapConfig {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for AdminBootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrapConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Footer social links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLinks {
    pub facebook: String,
    pub twitter: String,
    pub instagram: String,
    pub linkedin: String,
}

impl Default for SocialLinks {
    fn default() -> Self {
        Self {
            facebook: "#".to_owned(),
            twitter: "#".to_owned(),
            instagram: "#".to_owned(),
            linkedin: "#".to_owned(),
        }
    }
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub environment: Environment,
    /// Key material for CSRF token signing
    pub session_secret: SecretString,
    pub admin_bootstrap: AdminBootstrapConfig,
    /// Directory served at `/`; uploads live in `<root>/uploads`
    pub uploads_root: PathBuf,
    pub social: SocialLinks,
    pub hero_sweep_interval: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (length everywhere; placeholder detection
    /// and entropy in production).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = Environment::parse(
            &get_optional_env("APP_ENV")
                .or_else(|| get_optional_env("NODE_ENV"))
                .unwrap_or_default(),
        );

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_optional_env("SITE_PORT")
            .or_else(|| get_optional_env("PORT"))
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;

        let session_secret = SecretString::from(get_required_env("SESSION_SECRET")?);
        validate_session_secret(&session_secret, "SESSION_SECRET")?;
        if environment.is_production() {
            validate_secret_strength(session_secret.expose_secret(), "SESSION_SECRET")?;
        }

        let admin_bootstrap = AdminBootstrapConfig {
            username: get_optional_env("ADMIN_USERNAME").filter(|v| !v.trim().is_empty()),
            password: get_optional_env("ADMIN_PASSWORD")
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
        };

        let social = SocialLinks {
            facebook: get_env_or_default("FACEBOOK_URL", "#"),
            twitter: get_env_or_default("TWITTER_URL", "#"),
            instagram: get_env_or_default("INSTAGRAM_URL", "#"),
            linkedin: get_env_or_default("LINKEDIN_URL", "#"),
        };

        let hero_sweep_interval =
            parse_sweep_interval(get_optional_env("HERO_SWEEP_INTERVAL_SECS").as_deref())?;

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            session_secret,
            admin_bootstrap,
            uploads_root: PathBuf::from(get_env_or_default("UPLOADS_ROOT", "public")),
            social,
            hero_sweep_interval,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT")
                .or_else(|| Some(environment.as_str().to_owned())),
            sentry_sample_rate: get_f32_or_default("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_f32_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Development settings pointing at a local database that need not exist.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn for_tests(uploads_root: PathBuf) -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/lakeside_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            environment: Environment::Development,
            session_secret: SecretString::from("k3Y9#pQ2!vL8@wZ5$rT1^mN6&hB4*jX7"),
            admin_bootstrap: AdminBootstrapConfig::default(),
            uploads_root,
            social: SocialLinks::default(),
            hero_sweep_interval: Duration::from_secs(DEFAULT_HERO_SWEEP_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional float variable.
fn get_f32_or_default(key: &str, default: f32) -> Result<f32, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |v| {
        v.parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Sweep period from `HERO_SWEEP_INTERVAL_SECS`. Zero is rejected; values
/// under a minute are raised to one.
fn parse_sweep_interval(value: Option<&str>) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("HERO_SWEEP_INTERVAL_SECS".to_owned(), reason)
    };
    let secs = match value {
        None => DEFAULT_HERO_SWEEP_SECS,
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?,
    };
    if secs == 0 {
        return Err(invalid("must be greater than zero".to_owned()));
    }
    Ok(Duration::from_secs(secs.max(60)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" Production "), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result =
            validate_secret_strength("changeme-changeme-changeme-changeme", "SESSION_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "SESSION_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "SESSION_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "SESSION_SECRET").is_err());
        assert!(
            validate_session_secret(&SecretString::from("a".repeat(32)), "SESSION_SECRET").is_ok()
        );
    }

    #[test]
    fn test_sweep_interval_rejects_zero() {
        assert!(matches!(
            parse_sweep_interval(Some("0")),
            Err(ConfigError::InvalidEnvVar(name, _)) if name == "HERO_SWEEP_INTERVAL_SECS"
        ));
        assert!(parse_sweep_interval(Some("soon")).is_err());
    }

    #[test]
    fn test_sweep_interval_default_and_floor() {
        assert_eq!(
            parse_sweep_interval(None).unwrap(),
            Duration::from_secs(DEFAULT_HERO_SWEEP_SECS)
        );
        assert_eq!(parse_sweep_interval(Some("5")).unwrap(), Duration::from_secs(60));
        assert_eq!(parse_sweep_interval(Some(" 3600 ")).unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_bootstrap_debug_redacts_password() {
        let config = AdminBootstrapConfig {
            username: Some("owner".to_owned()),
            password: Some(SecretString::from("tractor-blue-77")),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("owner"));
        assert!(!debug.contains("tractor-blue-77"));
    }
}

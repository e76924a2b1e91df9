//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every variable is optional; the engine boots with local defaults.
//!
//! ## Server
//! - `DATABASE_URL` - `SQLite` connection string (default: `sqlite://mona.db`)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8000)
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins (default: `http://localhost:3000`)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! ## Authentication
//! - `MIA_API_KEY` - Shared secret expected in the `X-API-Key` header.
//!   When unset, every protected request fails with a misconfiguration error.
//!
//! ## Language model
//! - `GROQ_API_KEY` - API key for the chat-completions provider. When unset the
//!   assistant answers with a canned "can't connect" reply.
//! - `LLM_BASE_URL` - Chat-completions base URL (default: Groq's `OpenAI` endpoint)
//! - `LLM_MODEL` - Model ID (default: llama-3.3-70b-versatile)
//! - `LLM_TIMEOUT_SECS` - Request timeout (default: 30)
//!
//! ## Notifications
//! - `NOTIFICATION_INTERVAL_SECS` - Poll interval (default: 1800)
//! - `NOTIFICATION_QUEUE_CAPACITY` - Alerts kept per tenant (default: 20)
//!
//! ## Shopify
//! - `SHOPIFY_API_VERSION` - REST API version (default: 2023-10)
//! - `SHOPIFY_WEBHOOK_SECRET` - Enables HMAC verification of webhooks
//!
//! ## Error tracking
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_DATABASE_URL: &str = "sqlite://mona.db";
const DEFAULT_SHOPIFY_API_VERSION: &str = "2023-10";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Expected `X-API-Key` value
    pub api_key: Option<SecretString>,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Emit JSON logs
    pub log_json: bool,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Notification poller configuration
    pub notifications: NotificationConfig,
    /// Shopify connector configuration
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Chat-completions provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider API key; `None` puts the assistant in degraded mode
    pub api_key: Option<SecretString>,
    /// Base URL ending before `/chat/completions`
    pub base_url: Url,
    /// Model ID
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Notification poller configuration.
#[derive(Debug, Clone, Copy)]
pub struct NotificationConfig {
    /// How often tenants are scanned
    pub interval: Duration,
    /// Maximum alerts held per tenant before the oldest is dropped
    pub queue_capacity: usize,
}

/// Shopify connector configuration.
///
/// Implements `Debug` manually to redact the webhook secret.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// REST Admin API version
    pub api_version: String,
    /// Shared secret for `X-Shopify-Hmac-Sha256` verification
    pub webhook_secret: Option<SecretString>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("api_version", &self.api_version)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = SecretString::from(
            get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        );

        let host = parse_or("HOST", get("HOST"), IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or("PORT", get("PORT"), 8000_u16)?;

        let api_key = get("MIA_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "MIA_API_KEY") {
                tracing::warn!("MIA_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });

        let allowed_origins = get("ALLOWED_ORIGINS").map_or_else(
            || vec!["http://localhost:3000".to_string()],
            |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(ToString::to_string)
                    .collect()
            },
        );

        let log_json = get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        let base_url_raw = get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());
        let base_url = Url::parse(base_url_raw.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar("LLM_BASE_URL".to_string(), e.to_string()))?;

        let llm = LlmConfig {
            api_key: get("GROQ_API_KEY").map(SecretString::from),
            base_url,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                30_u64,
            )?),
        };

        let interval_secs = parse_or(
            "NOTIFICATION_INTERVAL_SECS",
            get("NOTIFICATION_INTERVAL_SECS"),
            30 * 60_u64,
        )?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "NOTIFICATION_INTERVAL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let queue_capacity = parse_or(
            "NOTIFICATION_QUEUE_CAPACITY",
            get("NOTIFICATION_QUEUE_CAPACITY"),
            20_usize,
        )?
        .max(1);

        let notifications = NotificationConfig {
            interval: Duration::from_secs(interval_secs),
            queue_capacity,
        };

        let shopify = ShopifyConfig {
            api_version: get("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SHOPIFY_API_VERSION.to_string()),
            webhook_secret: get("SHOPIFY_WEBHOOK_SECRET").map(SecretString::from),
        };

        Ok(Self {
            database_url,
            host,
            port,
            api_key,
            allowed_origins,
            log_json,
            llm,
            notifications,
            shopify,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: get("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse an optional raw value, falling back to a default when unset.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-tier model used when a request does not name one
pub const DEFAULT_FREE_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";

/// Default upstream API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Shortest credential the function transport accepts as configured
pub const MIN_API_KEY_LENGTH: usize = 10;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream (OpenRouter) API configuration
    pub upstream: UpstreamConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How the HTTP surface is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Long-running TCP listener
    Server,
    /// Per-invocation handler inside a serverless runtime
    Function,
}

impl FromStr for DeploymentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(DeploymentMode::Server),
            "function" | "serverless" => Ok(DeploymentMode::Function),
            other => anyhow::bail!("Invalid deployment mode: {}", other),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Server => write!(f, "server"),
            DeploymentMode::Function => write!(f, "function"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Deployment mode
    pub mode: DeploymentMode,
}

/// Parse a boolean environment flag
fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

/// Upstream API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API key, `None` when unset or blank
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Model used when the caller supplies none
    pub default_model: String,
    /// Value of the `X-Title` identification header
    pub app_title: String,
    /// Value of the `HTTP-Referer` identification header
    pub app_referer: String,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_model", &self.default_model)
            .field("app_title", &self.app_title)
            .field("app_referer", &self.app_referer)
            .finish()
    }
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (`*` accepts any)
    pub allowed_origins: Vec<String>,
    /// Whether `X-Forwarded-For` / `X-Real-IP` identify the client
    pub trust_proxy: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level / filter directive
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    ///
    /// Used by [`Settings::new`] with the process environment, and by tests
    /// with an in-memory map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mode: DeploymentMode = get("DEPLOYMENT_MODE", "server")
            .parse()
            .context("Invalid DEPLOYMENT_MODE")?;

        let (default_body_limit, default_trust_proxy) = match mode {
            DeploymentMode::Server => ("1048576", "false"),
            DeploymentMode::Function => ("5242880", "true"),
        };

        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let settings = Self {
            server: ServerConfig {
                host: get("HOST", "0.0.0.0"),
                port: get("PORT", "3001")
                    .parse()
                    .context("Invalid port number")?,
                mode,
            },
            upstream: UpstreamConfig {
                api_key,
                base_url: get("OPENROUTER_BASE_URL", DEFAULT_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                timeout: get("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
                default_model: get("DEFAULT_MODEL", DEFAULT_FREE_MODEL),
                app_title: get("APP_TITLE", "AI Resume Builder"),
                app_referer: get("APP_REFERER", "http://localhost:3001"),
            },
            request: RequestConfig {
                max_request_size: get("MAX_REQUEST_SIZE", default_body_limit)
                    .parse()
                    .context("Invalid maximum request size")?,
            },
            security: SecurityConfig {
                allowed_origins: get("ALLOWED_ORIGINS", "http://localhost:3000,http://localhost:3001")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                trust_proxy: parse_flag(&get("TRUST_PROXY", default_trust_proxy))
                    .context("Invalid TRUST_PROXY value")?,
            },
            rate_limit: RateLimitConfig {
                max_requests: get("RATE_LIMIT_MAX_REQUESTS", "100")
                    .parse()
                    .context("Invalid rate limit request count")?,
                window_secs: get("RATE_LIMIT_WINDOW_SECS", "900")
                    .parse()
                    .context("Invalid rate limit window")?,
            },
            logging: LoggingConfig {
                level: get("RUST_LOG", "info"),
                format: get("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.server.mode == DeploymentMode::Server && self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if let Some(key) = &self.upstream.api_key {
            if key.contains(char::is_whitespace) {
                anyhow::bail!("OPENROUTER_API_KEY cannot contain whitespace characters");
            }
        }

        // Validate URL format
        if !self.upstream.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenRouter base URL format, should start with 'http'");
        }

        if self.upstream.default_model.trim().is_empty() {
            anyhow::bail!("Default model cannot be empty");
        }

        if self.upstream.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.request.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            anyhow::bail!("Rate limit request count and window must be greater than 0");
        }

        // Plain levels are checked; full filter directives are left to EnvFilter
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let is_directive = self.logging.level.contains('=') || self.logging.level.contains(',');
        if !is_directive && !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Whether an upstream credential is available
    ///
    /// The function transport is stricter and also rejects implausibly short keys.
    pub fn api_configured(&self) -> bool {
        match (&self.upstream.api_key, self.server.mode) {
            (None, _) => false,
            (Some(_), DeploymentMode::Server) => true,
            (Some(key), DeploymentMode::Function) => key.len() >= MIN_API_KEY_LENGTH,
        }
    }

    /// Whether CORS should accept any origin
    pub fn allows_any_origin(&self) -> bool {
        self.server.mode == DeploymentMode::Function
            || self.security.allowed_origins.iter().any(|o| o == "*")
    }

    /// Rate limit window length in whole minutes, as reported to clients
    pub fn rate_limit_window_minutes(&self) -> u64 {
        self.rate_limit.window_secs.div_ceil(60)
    }
}

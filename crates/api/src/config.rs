//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use stockscan_ai::VisionConfig;
use stockscan_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Upper bound for `TOKEN_TTL_MINUTES`: one year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub vision: VisionConfig,
    pub page_size: usize,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 60,
            database_url: None,
            vision: VisionConfig::default(),
            page_size: 10,
            max_upload_bytes: 10 * 1024 * 1024,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables
    /// fall back to their defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let jwt_secret = var("JWT_SECRET").unwrap_or(defaults.jwt_secret);

        let api_key = var("OPENAI_API_KEY");
        let provider = var("VISION_PROVIDER").unwrap_or_else(|| {
            let provider = if api_key.is_some() { "openai" } else { "disabled" };
            provider.to_string()
        });

        let vision = VisionConfig {
            provider,
            model: var("VISION_MODEL").unwrap_or(defaults.vision.model),
            base_url: var("VISION_BASE_URL").unwrap_or(defaults.vision.base_url),
            api_key,
            timeout_secs: parse_or(&var, "VISION_TIMEOUT_SECS", "number of seconds", defaults.vision.timeout_secs)?,
        };

        Ok(Self {
            bind_addr: parse_or(&var, "BIND_ADDR", "socket address", defaults.bind_addr)?,
            jwt_secret,
            token_ttl_minutes: parse_in_range(
                &var,
                "TOKEN_TTL_MINUTES",
                "number of minutes between 1 and 525600",
                defaults.token_ttl_minutes,
                1..=MAX_TOKEN_TTL_MINUTES,
            )?,
            database_url: var("DATABASE_URL"),
            vision,
            page_size: parse_or(&var, "PAGE_SIZE", "page size", defaults.page_size)?,
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", "byte count", defaults.max_upload_bytes)?,
            log_format: parse_or(&var, "LOG_FORMAT", "log format", defaults.log_format)?,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key,
            expected,
            value: raw,
        }),
    }
}

fn parse_in_range<F>(
    var: &F,
    key: &'static str,
    expected: &'static str,
    default: i64,
    range: std::ops::RangeInclusive<i64>,
) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(var, key, expected, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var: key,
            expected,
            value: value.to_string(),
        })
    }
}

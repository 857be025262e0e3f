//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAREK_API_ORIGIN` - Origin of the storefront API (e.g., `https://larek-api.example.com`)
//!
//! ## Optional
//! - `LAREK_API_PATH` - API path prefix (default: `/api/weblarek`)
//! - `LAREK_CDN_PATH` - Image path prefix (default: `/content/weblarek`)
//! - `LAREK_CURRENCY_UNIT` - Suffix shown after amounts (default: `synapses`)
//! - `LAREK_PRICELESS_LABEL` - Label for items without a price (default: `Priceless`)
//! - `LAREK_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use larek_core::CurrencyFormat;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storefront API settings
    pub api: ApiConfig,
    /// Currency display settings
    pub currency_unit: String,
    /// Label for items without a price
    pub priceless_label: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Storefront API endpoint configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API origin, without a trailing slash
    pub origin: Url,
    /// Prefix for JSON endpoints
    pub api_path: String,
    /// Prefix for catalog images
    pub cdn_path: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config with default paths for the given origin.
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            api_path: "/api/weblarek".to_string(),
            cdn_path: "/content/weblarek".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Base URL of JSON endpoints, e.g. `https://host/api/weblarek`.
    #[must_use]
    pub fn api_base(&self) -> String {
        join(&self.origin, &self.api_path)
    }

    /// Base URL of catalog images.
    #[must_use]
    pub fn cdn_base(&self) -> String {
        join(&self.origin, &self.cdn_path)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let origin = parse_origin("LAREK_API_ORIGIN", &get_required_env("LAREK_API_ORIGIN")?)?;
        let timeout_secs = get_env_or_default("LAREK_REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LAREK_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let api = ApiConfig {
            origin,
            api_path: get_env_or_default("LAREK_API_PATH", "/api/weblarek"),
            cdn_path: get_env_or_default("LAREK_CDN_PATH", "/content/weblarek"),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            api,
            currency_unit: get_env_or_default("LAREK_CURRENCY_UNIT", "synapses"),
            priceless_label: get_env_or_default("LAREK_PRICELESS_LABEL", "Priceless"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Currency display settings for `format_currency`.
    #[must_use]
    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_unit.clone(), self.priceless_label.clone())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and check an origin URL: http(s), with a host, no path.
fn parse_origin(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "origin must have a host".to_string(),
        ));
    }
    if url.path() != "/" {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "origin must not contain a path; use LAREK_API_PATH".to_string(),
        ));
    }
    Ok(url)
}

/// Join an origin and a path prefix without doubling slashes.
fn join(origin: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        origin.as_str().trim_end_matches('/'),
        path.trim_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_accepts_https_host() {
        let url = parse_origin("X", "https://larek-api.nomoreparties.co").unwrap();
        assert_eq!(url.host_str(), Some("larek-api.nomoreparties.co"));
    }

    #[test]
    fn test_parse_origin_rejects_path() {
        let err = parse_origin("X", "https://host/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "X"));
    }

    #[test]
    fn test_parse_origin_rejects_scheme() {
        assert!(parse_origin("X", "ftp://host").is_err());
        assert!(parse_origin("X", "not a url").is_err());
    }

    #[test]
    fn test_api_and_cdn_base() {
        let api = ApiConfig::new(Url::parse("https://host").unwrap());
        assert_eq!(api.api_base(), "https://host/api/weblarek");
        assert_eq!(api.cdn_base(), "https://host/content/weblarek");
    }

    #[test]
    fn test_join_trims_slashes() {
        let origin = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(join(&origin, "/api/"), "http://localhost:8080/api");
    }

    #[test]
    fn test_currency_format_from_config() {
        let config = StorefrontConfig {
            api: ApiConfig::new(Url::parse("https://host").unwrap()),
            currency_unit: "credits".to_string(),
            priceless_label: "Free".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert_eq!(config.currency(), CurrencyFormat::new("credits", "Free"));
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 3000;
const CONFIG_DIR: &str = "config";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_RAZORPAY_BASE_URL: &str = "https://api.razorpay.com";
/// Development fallback token; rejected outside development.
const DEV_DEFAULT_ADMIN_TOKEN: &str = "mysecrettoken";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Shared secret for the admin bearer gate
    #[validate(custom = "validate_admin_token")]
    pub admin_token: String,

    /// Razorpay key id, echoed to the checkout widget
    #[serde(default)]
    pub razorpay_key_id: String,

    /// Razorpay key secret; signs gateway callbacks
    #[serde(default)]
    pub razorpay_key_secret: String,

    /// Razorpay API base URL (overridden in tests)
    #[serde(default = "default_razorpay_base_url")]
    pub razorpay_base_url: String,

    /// Currency for gateway orders (ISO 4217)
    #[serde(default = "default_currency")]
    #[validate(custom = "validate_currency")]
    pub default_currency: String,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Creates a minimal configuration, used mainly by tests.
    pub fn new(
        database_url: String,
        admin_token: String,
        razorpay_key_id: String,
        razorpay_key_secret: String,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            admin_token,
            razorpay_key_id,
            razorpay_key_secret,
            razorpay_base_url: default_razorpay_base_url(),
            default_currency: default_currency(),
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && self.admin_token.trim() == DEV_DEFAULT_ADMIN_TOKEN {
            let mut err = ValidationError::new("admin_token_default_dev");
            err.message = Some(
                "The bundled development admin token must not be used outside development. Set APP__ADMIN_TOKEN to a unique, secure value."
                    .into(),
            );
            errors.add("admin_token", err);
        }

        if !self.is_development()
            && (self.razorpay_key_id.trim().is_empty() || self.razorpay_key_secret.trim().is_empty())
        {
            let mut err = ValidationError::new("razorpay_credentials_required");
            err.message = Some(
                "Set APP__RAZORPAY_KEY_ID and APP__RAZORPAY_KEY_SECRET for non-development environments"
                    .into(),
            );
            errors.add("razorpay_key_secret", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_razorpay_base_url() -> String {
    DEFAULT_RAZORPAY_BASE_URL.to_string()
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_request_timeout_secs() -> u64 {
    30
}

fn validate_admin_token(token: &str) -> Result<(), ValidationError> {
    let trimmed = token.trim();

    if trimmed.is_empty() {
        let mut err = ValidationError::new("admin_token");
        err.message = Some("Admin token must not be empty".into());
        return Err(err);
    }

    // Reject obvious placeholders that would leave the catalog writable to anyone
    const DISALLOWED: [&str; 3] = ["changeme", "secret", "token"];
    if DISALLOWED
        .iter()
        .any(|&bad| trimmed.eq_ignore_ascii_case(bad))
    {
        let mut err = ValidationError::new("admin_token");
        err.message = Some("Admin token must be overridden with a secure random value".into());
        return Err(err);
    }

    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency");
        err.message = Some("Currency must be a 3-letter ISO code".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("storefront_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    // NOTE: admin_token has a development-only default;
    // validate_additional_constraints rejects it outside development.
    let config = Config::builder()
        .set_default("database_url", "sqlite://storefront.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("admin_token", DEV_DEFAULT_ADMIN_TOKEN)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    app_config.validate_additional_constraints()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(environment: &str) -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".to_string(),
            "an-actual-secret-value".to_string(),
            "rzp_test_key".to_string(),
            "rzp_test_secret".to_string(),
            "127.0.0.1".to_string(),
            3000,
            environment.to_string(),
        )
    }

    #[test]
    fn development_accepts_bundled_token() {
        let mut cfg = test_config("development");
        cfg.admin_token = DEV_DEFAULT_ADMIN_TOKEN.to_string();
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn production_rejects_bundled_token() {
        let mut cfg = test_config("production");
        cfg.admin_token = DEV_DEFAULT_ADMIN_TOKEN.to_string();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn production_requires_gateway_credentials() {
        let mut cfg = test_config("production");
        cfg.razorpay_key_secret = String::new();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn empty_admin_token_fails_validation() {
        assert!(validate_admin_token("").is_err());
        assert!(validate_admin_token("   ").is_err());
    }

    #[test]
    fn placeholder_admin_tokens_fail_validation() {
        assert!(validate_admin_token("changeme").is_err());
        assert!(validate_admin_token("SECRET").is_err());
        assert!(validate_admin_token("xK2p-9fQ_real").is_ok());
    }

    #[test]
    fn currency_codes_are_checked() {
        assert!(validate_currency("INR").is_ok());
        assert!(validate_currency("usd").is_ok());
        assert!(validate_currency("RUPEES").is_err());
        assert!(validate_currency("I2R").is_err());
    }
}

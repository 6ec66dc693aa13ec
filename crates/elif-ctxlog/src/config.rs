//! # Logging Configuration
//!
//! Installs the `tracing` subscriber that [`TracingSink`](crate::TracingSink)
//! emits into.

use std::env;
use std::io;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ConfigError, CtxLogError, CtxLogResult};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: s.to_string(),
                expected: "compact, pretty, or json".to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    pub format: LogFormat,
    /// Environment filter (e.g. "elif_ctxlog=debug,tower=info"); overrides `level`
    pub env_filter: Option<String>,
    /// Service name recorded on the initialization event
    pub service_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            env_filter: None,
            service_name: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            env_filter: Some("elif_ctxlog=info,tower=warn,axum=warn".to_string()),
            service_name: None,
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            env_filter: Some("elif_ctxlog=debug".to_string()),
            service_name: None,
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            format: LogFormat::Compact,
            env_filter: None,
            service_name: None,
        }
    }

    /// Load from `LOG_LEVEL`, `LOG_FORMAT`, `LOG_FILTER` and `SERVICE_NAME`
    pub fn from_env() -> Result<Self, ConfigError> {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .parse::<LogFormat>()?;

        let config = Self {
            level,
            format,
            env_filter: env::var("LOG_FILTER").ok(),
            service_name: env::var("SERVICE_NAME").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "level".to_string(),
                value: self.level.clone(),
                expected: "trace, debug, info, warn, or error".to_string(),
            });
        }

        if matches!(&self.env_filter, Some(filter) if filter.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed {
                field: "env_filter".to_string(),
                reason: "Environment filter cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn with_service<S: Into<String>>(mut self, name: S) -> Self {
        self.service_name = Some(name.into());
        self
    }
}

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG`, when set, takes precedence over the configured filter.
pub fn init_logging(config: LoggingConfig) -> CtxLogResult<()> {
    config.validate()?;

    let directive = config.env_filter.as_deref().unwrap_or(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| CtxLogError::subscriber(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(Layer::new().with_writer(io::stdout).json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(Layer::new().with_writer(io::stdout).pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(Layer::new().with_writer(io::stdout).compact())
            .try_init(),
    };
    installed.map_err(|e| CtxLogError::subscriber(e.to_string()))?;

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        service = config.service_name.as_deref().unwrap_or("unknown"),
        "Context logging initialized"
    );
    Ok(())
}

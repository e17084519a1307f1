use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    ImportSettings, InvalidRowPolicy, LoggingSettings, OutputFormat, ReportSettings,
};

/// Loads the application configuration.
///
/// Reads `path` when given (the file must exist), otherwise an optional
/// `config.toml` in the working directory. Environment variables prefixed with
/// `JOURNAL__` override file values, e.g. `JOURNAL__REPORT__TOP_TICKERS=5`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("JOURNAL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Parses configuration from a TOML string. Used by tests and embedders.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Checks the cross-field rules `serde` cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let edges = &config.report.price_buckets;
    if edges.is_empty() {
        return Err(ConfigError::ValidationError(
            "report.price_buckets must contain at least one edge".to_string(),
        ));
    }
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::ValidationError(format!(
            "report.price_buckets must be strictly ascending, got {edges:?}"
        )));
    }
    if edges[0].is_sign_negative() {
        return Err(ConfigError::ValidationError(
            "report.price_buckets must not start below zero".to_string(),
        ));
    }
    if config.report.top_tickers == 0 || config.report.worst_tickers == 0 {
        return Err(ConfigError::ValidationError(
            "report.top_tickers and report.worst_tickers must be at least 1".to_string(),
        ));
    }
    Ok(())
}

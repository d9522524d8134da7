//! Campus configuration system.
//!
//! TOML-based configuration shared by the relay server and the command-line
//! client. All sections use defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use campus_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    ApiConfig, CampusConfig, LogLevel, LoggingConfig, RealtimeConfig, RelayConfig, ToastConfig,
    CONFIG_SCHEMA_VERSION,
};
pub use toml_loader::{default_config_path, load_default, load_from_path};

use campus_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a documented default `config.toml` if none exists.
pub fn load_config() -> Result<CampusConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path when given, otherwise the default path.
pub fn load_config_from(path: Option<&std::path::Path>) -> Result<CampusConfig, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            let config = toml_loader::load_from_path(path)?;
            validation::validate(&config)?;
            Ok(config)
        }
        None => load_config(),
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &CampusConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

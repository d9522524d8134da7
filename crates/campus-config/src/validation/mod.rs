//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator runs them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod misc;
mod network;


use crate::schema::CampusConfig;
use campus_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CampusConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    network::validate_urls(&mut errors, config);
    network::validate_bind(&mut errors, config);
    misc::validate_realtime(&mut errors, config);
    misc::validate_api(&mut errors, config);
    misc::validate_relay(&mut errors, config);
    misc::validate_toasts(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

//! Where the config file lives, and seeding it on first run.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use campus_common::ConfigError;
use tracing::{debug, info};

use super::template::default_config_toml;

const APP_DIR: &str = "campus";
const FILE_NAME: &str = "config.toml";

/// `<platform config dir>/campus/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

/// Writes the commented template to `path`, creating parent directories.
/// An existing file is left untouched.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| io_failure("cannot create", dir, e))?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => file
            .write_all(default_config_toml().as_bytes())
            .map_err(|e| io_failure("cannot write", path, e))?,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Config already present");
            return Ok(());
        }
        Err(e) => return Err(io_failure("cannot create", path, e)),
    }

    info!(path = %path.display(), "Wrote default config");
    Ok(())
}

fn io_failure(action: &str, path: &Path, err: io::Error) -> ConfigError {
    ConfigError::ParseError(format!("{action} {}: {err}", path.display()))
}

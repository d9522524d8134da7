use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("realtime error: {0}")]
    Realtime(String),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("realtime.url must start with ws://".into());
        assert_eq!(
            err.to_string(),
            "config validation error: realtime.url must start with ws://"
        );
    }

    #[test]
    fn campus_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: CampusError = config_err.into();
        assert!(matches!(err, CampusError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn campus_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: CampusError = io_err.into();
        assert!(matches!(err, CampusError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn campus_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CampusError = json_err.into();
        assert!(matches!(err, CampusError::Json(_)));
    }

    #[test]
    fn campus_error_other_variants() {
        let err = CampusError::Network("timeout".into());
        assert_eq!(err.to_string(), "network error: timeout");

        let err = CampusError::Realtime("not connected".into());
        assert_eq!(err.to_string(), "realtime error: not connected");

        let err = CampusError::Relay("bind failed".into());
        assert_eq!(err.to_string(), "relay error: bind failed");

        let err = CampusError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}

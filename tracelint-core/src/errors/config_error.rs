//! Configuration errors.

/// Errors from loading and merging `ValidateConfig` layers.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

// Error types for settings and catalogue loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load settings: {0}")]
    LoadError(String),

    #[error("settings are not well formed: {0}")]
    ParseError(String),

    #[error("invalid setting: {0}")]
    ValidationError(String),

    #[error("settings do not match the expected shape: {0}")]
    DeserializationError(String),

    #[error("{key} has an unusable value {value:?}")]
    InvalidEnvValue { key: String, value: String },

    #[error("settings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("environment: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

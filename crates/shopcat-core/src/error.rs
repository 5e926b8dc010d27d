use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopcatError {
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid product input in {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("No rules for category: {name}")]
    CategoryNotFound { name: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, ShopcatError>;

impl ShopcatError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } => 2,
            Self::InvalidInput { .. } | Self::Json(_) => 3,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. }
            | Self::TomlDe(_) => 4,
            Self::InvalidRule { .. } => 5,
            _ => 1,
        }
    }
}

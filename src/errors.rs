// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FmtwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Formatter failed for parser '{parser}': {message}")]
    FormatterError { parser: String, message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FmtwatchError {
    pub fn formatter(parser: impl Into<String>, message: impl Into<String>) -> Self {
        FmtwatchError::FormatterError {
            parser: parser.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FmtwatchError>;

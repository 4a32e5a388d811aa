//! Application error types

use std::path::PathBuf;
use thiserror::Error;
use vitrine_animation::AnimationError;
use vitrine_core::CoreError;

/// Errors raised while configuring or driving a portfolio
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`crate::PortfolioConfig`]
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configured value is out of range
    #[error("invalid config value for `{key}`: {message}")]
    ConfigValue { key: &'static str, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

// quadlin_cli/src/error.rs

use quadlin_core::error::{EstimationError, LinearizationError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Linearization(#[from] LinearizationError),

    #[error(transparent)]
    Estimation(#[from] EstimationError),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unsupported data format '{}': expected .toml or .json", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

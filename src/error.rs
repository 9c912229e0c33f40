use serde::Serialize;

use crate::models::Platform;

#[derive(Debug, thiserror::Error)]
pub enum SosError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch failed for '{brand}' on {platform}: {message}")]
    Fetch {
        platform: Platform,
        brand: String,
        message: String,
    },

    #[error("Invalid record for '{brand}': {message}")]
    Data { brand: String, message: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Run cancelled")]
    Cancelled,
}

/// Coarse classification of a [`SosError`], used when reporting failures
/// alongside successful results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Fetch,
    Data,
    Computation,
    Config,
    Cancelled,
}

impl SosError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SosError::Http(_) | SosError::Fetch { .. } => ErrorClass::Fetch,
            SosError::Json(_) | SosError::Data { .. } => ErrorClass::Data,
            SosError::Computation(_) => ErrorClass::Computation,
            SosError::Io(_) | SosError::Config(_) | SosError::InvalidArgument(_) => {
                ErrorClass::Config
            }
            SosError::Cancelled => ErrorClass::Cancelled,
        }
    }

    pub(crate) fn data(brand: &str, message: impl Into<String>) -> Self {
        SosError::Data {
            brand: brand.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn fetch(platform: Platform, brand: &str, message: impl Into<String>) -> Self {
        SosError::Fetch {
            platform,
            brand: brand.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SosError>;

//! Centralized error types for weatherlens.
//!
//! Library crates keep their own error enums; the binary maps them into
//! `AppError` so every failure has a short message fit for the terminal.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Analytics(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// [`user_message`](Self::user_message), followed by the backend's or
    /// the validator's own text when that text is meant for the user.
    pub fn display_message(&self) -> String {
        match self {
            AppError::Network(NetworkError::BackendFailure { message, .. })
            | AppError::Analytics(AnalyticsError::InvalidInput(message)) => {
                format!("{} ({})", self.user_message(), message)
            }
            _ => self.user_message().to_string(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{endpoint} reported failure: {message}")]
    BackendFailure { endpoint: String, message: String },
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the weather backend. Is it running?"
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather backend is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request was rejected by the backend.",
            NetworkError::InvalidResponse(_) => {
                "The backend returned data in an unexpected shape."
            }
            NetworkError::BackendFailure { .. } => "The weather backend reported an error.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Errors from the derived analytics (forecasts, probabilities).
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("No centroids available: {0}")]
    NoCentroids(String),

    #[error("No temperature prediction available")]
    NoPrediction,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl AnalyticsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalyticsError::NoCentroids(_) => "Season centroids are not available yet.",
            AnalyticsError::NoPrediction => "Failed to fetch predicted temperature.",
            AnalyticsError::InvalidInput(_) => {
                "Invalid input. Please check your values and try again."
            }
            AnalyticsError::Calculation(_) => "Failed to calculate season probabilities.",
        }
    }
}

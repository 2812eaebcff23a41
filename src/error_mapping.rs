//! Map library errors onto the application error hierarchy.

use weatherlens_analytics::ForecastError;
use weatherlens_client::ClientError;
use weatherlens_core::{AnalyticsError, AppError, ConfigError, NetworkError};

pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for ClientError {
    fn into_app_error(self) -> AppError {
        match self {
            ClientError::Network(e) if e.is_timeout() => NetworkError::Timeout.into(),
            ClientError::Network(e) => NetworkError::ConnectionFailed(e.to_string()).into(),
            ClientError::Status {
                endpoint,
                status,
                body,
            } => NetworkError::ServerError {
                status,
                message: format!("{}: {}", endpoint, body),
            }
            .into(),
            e @ ClientError::Schema { .. } => NetworkError::InvalidResponse(e.to_string()).into(),
            ClientError::Api { endpoint, message } => {
                NetworkError::BackendFailure { endpoint, message }.into()
            }
            ClientError::InvalidInput(msg) => AnalyticsError::InvalidInput(msg).into(),
            ClientError::InvalidUrl(e) => ConfigError::Invalid(e.to_string()).into(),
        }
    }
}

impl IntoAppError for ForecastError {
    fn into_app_error(self) -> AppError {
        match self {
            ForecastError::Client(e) => e.into_app_error(),
            ForecastError::CentroidsUnavailable(msg) => AnalyticsError::NoCentroids(msg).into(),
            ForecastError::MissingPrediction => AnalyticsError::NoPrediction.into(),
            ForecastError::Probability(e) => AnalyticsError::Calculation(e.to_string()).into(),
        }
    }
}

use thiserror::Error;
use weatherlens_client::ClientError;

#[derive(Debug, Error, PartialEq)]
pub enum ProbabilityError {
    #[error("no centroids to compare against")]
    NoCentroids,

    #[error("predicted temperature is not finite: {0}")]
    NonFiniteTemperature(f64),

    #[error("centroid {cluster} has a non-finite temperature")]
    NonFiniteCentroid { cluster: String },
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("centroids unavailable: {0}")]
    CentroidsUnavailable(String),

    #[error("predicted temperature is missing")]
    MissingPrediction,

    #[error(transparent)]
    Probability(#[from] ProbabilityError),
}

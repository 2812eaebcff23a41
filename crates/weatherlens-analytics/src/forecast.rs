//! Tomorrow's season outlook: fetch centroids and the predicted temperature,
//! then weight the seasons by distance.

use std::sync::Arc;

use serde::Serialize;
use weatherlens_client::AnalyticsClient;

use crate::error::ForecastError;
use crate::probability::{try_season_probabilities, SeasonProbabilities};
use crate::store::CentroidStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonForecast {
    /// °C, absent when the prediction could not be fetched
    pub predicted_temperature: Option<f64>,
    #[serde(flatten)]
    pub probabilities: SeasonProbabilities,
}

#[derive(Debug, Clone)]
pub struct SeasonForecaster {
    client: Arc<AnalyticsClient>,
    store: Arc<CentroidStore>,
}

impl SeasonForecaster {
    pub fn new(client: Arc<AnalyticsClient>, store: Arc<CentroidStore>) -> Self {
        Self { client, store }
    }

    /// Refresh centroids, fetch the prediction and compute probabilities.
    ///
    /// Nothing is memoized; each call hits the backend again.
    pub async fn forecast(&self) -> Result<SeasonForecast, ForecastError> {
        let centroids = self.store.refresh().await?;

        let temperature = self
            .client
            .predict_temp_tomorrow()
            .await?
            .ok_or(ForecastError::MissingPrediction)?;

        let probabilities = try_season_probabilities(&centroids, temperature)?;
        tracing::info!(
            "Season probabilities for {:.2}°C across {} clusters",
            temperature,
            probabilities.probabilities.len()
        );

        Ok(SeasonForecast {
            predicted_temperature: Some(temperature),
            probabilities,
        })
    }

    /// Best-effort forecast for display.
    ///
    /// The prediction and the centroids are fetched independently, so a
    /// failed centroid refresh still reports the predicted temperature.
    /// Empty probability maps mean the probabilities could not be computed.
    pub async fn forecast_or_empty(&self) -> SeasonForecast {
        let predicted_temperature = match self.client.predict_temp_tomorrow().await {
            Ok(Some(t)) => Some(t),
            Ok(None) => {
                tracing::warn!("Backend returned no predicted temperature");
                None
            }
            Err(e) => {
                tracing::warn!("Error fetching predicted temperature: {}", e);
                None
            }
        };

        let probabilities = match (self.store.refresh().await, predicted_temperature) {
            (Ok(centroids), Some(t)) => match try_season_probabilities(&centroids, t) {
                Ok(probabilities) => probabilities,
                Err(e) => {
                    tracing::warn!("Error calculating probabilities: {}", e);
                    SeasonProbabilities::default()
                }
            },
            // A missing input has already been logged.
            _ => SeasonProbabilities::default(),
        };

        SeasonForecast {
            predicted_temperature,
            probabilities,
        }
    }
}

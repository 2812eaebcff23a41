//! Analytics backend API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::instrument;
use url::Url;

use crate::error::ClientError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::*;

const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8004/api";
const DEFAULT_DATA_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("weatherlens/", env!("CARGO_PKG_VERSION"));

/// Where the backend lives and how patient to be with it.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Clustering and prediction service
    pub analytics_url: String,
    /// Aggregation, correlation and decomposition service
    pub data_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            analytics_url: DEFAULT_ANALYTICS_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

/// Which backend service an endpoint belongs to
#[derive(Debug, Clone, Copy)]
enum Service {
    Analytics,
    Data,
}

#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    client: Arc<Client>,
    analytics_base: Url,
    data_base: Url,
    retry: RetryConfig,
}

impl AnalyticsClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            analytics_base: base_url(&settings.analytics_url)?,
            data_base: base_url(&settings.data_url)?,
            retry: settings.retry,
        })
    }

    fn url(&self, service: Service, path: &str) -> Result<Url, ClientError> {
        let base = match service {
            Service::Analytics => &self.analytics_base,
            Service::Data => &self.data_base,
        };
        Ok(base.join(path)?)
    }

    /// GET `path` with retries, check the status and parse the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(service, path)?;
        tracing::debug!("GET {}", url);

        let response = with_retry(&self.retry, || self.client.get(url.clone()).send()).await?;
        self.handle_response(path, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}", endpoint, status);
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!("Failed to parse {} response: {}", endpoint, e);
            ClientError::schema(endpoint, e.to_string())
        })
    }

    /// Season cluster centroids.
    #[instrument(skip(self), level = "info")]
    pub async fn get_centroids(&self) -> Result<Vec<Centroid>, ClientError> {
        let centroids: Vec<Centroid> = self.get_json(Service::Analytics, "get_centroids").await?;
        tracing::info!("Fetched {} centroids", centroids.len());
        Ok(centroids)
    }

    /// Observations labelled with their season cluster.
    #[instrument(skip(self), level = "info")]
    pub async fn get_cluster_data(&self) -> Result<Vec<ClusterObservation>, ClientError> {
        let rows: Vec<ClusterObservation> =
            self.get_json(Service::Analytics, "data_cluster").await?;
        tracing::info!("Fetched {} clustered observations", rows.len());
        Ok(rows)
    }

    /// Correlation matrix between weather variables.
    #[instrument(skip(self), level = "info")]
    pub async fn get_correlation(&self) -> Result<CorrelationMatrix, ClientError> {
        let rows: Vec<Map<String, Value>> = self.get_json(Service::Data, "correlation").await?;
        CorrelationMatrix::from_rows(rows).map_err(|e| ClientError::schema("correlation", e))
    }

    /// Trend/seasonal/residual decomposition per timestamp.
    #[instrument(skip(self), level = "info")]
    pub async fn get_seasonal(&self) -> Result<Vec<SeasonalRecord>, ClientError> {
        let records: Vec<SeasonalRecord> = self.get_json(Service::Data, "seasonal").await?;
        tracing::info!("Fetched {} seasonal records", records.len());
        Ok(records)
    }

    /// Weather rows aggregated by day, week or month.
    #[instrument(skip(self), level = "info")]
    pub async fn get_aggregates(
        &self,
        period: AggregatePeriod,
    ) -> Result<Vec<AggregatedRow>, ClientError> {
        let endpoint = period.path();
        let rows: Vec<Map<String, Value>> = self.get_json(Service::Data, endpoint).await?;

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                AggregatedRow::from_map(row, period.key_field())
                    .map_err(|e| ClientError::schema(endpoint, format!("row {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Fetched {} rows from {}", rows.len(), endpoint);
        Ok(rows)
    }

    /// Tomorrow's predicted temperature in °C, `None` when the backend has none.
    #[instrument(skip(self), level = "info")]
    pub async fn predict_temp_tomorrow(&self) -> Result<Option<f64>, ClientError> {
        let forecast: TemperatureForecast = self
            .get_json(Service::Analytics, "predict-temp-tomorrow")
            .await?;

        match forecast.temperature_tomorrow {
            Some(t) if !t.is_finite() => Err(ClientError::schema(
                "predict-temp-tomorrow",
                "temperature_tomorrow is not finite",
            )),
            other => Ok(other),
        }
    }

    /// Classify a day's weather into a season.
    ///
    /// Features are validated locally first. Sent once; POSTs are not retried.
    #[instrument(skip(self), level = "info")]
    pub async fn predict_season_for_day(
        &self,
        features: &SeasonFeatures,
    ) -> Result<SeasonPrediction, ClientError> {
        features.validate().map_err(ClientError::InvalidInput)?;

        let endpoint = "predict-season-for-day";
        let url = self.url(Service::Analytics, endpoint)?;
        let response = self.client.post(url).json(features).send().await?;

        let prediction: SeasonPrediction = self.handle_response(endpoint, response).await?;
        tracing::info!("Predicted season: {}", prediction.season_or_unknown());
        Ok(prediction)
    }

    /// Days per season for recent years.
    #[instrument(skip(self), level = "info")]
    pub async fn get_spider(&self) -> Result<Vec<SpiderPoint>, ClientError> {
        self.get_json(Service::Analytics, "get_spider").await
    }

    /// Recent historical readings and the next few predicted hours.
    #[instrument(skip(self), level = "info")]
    pub async fn get_prediction_chart(&self) -> Result<ChartData, ClientError> {
        let endpoint = "api/prediction_chart";
        let chart: PredictionChart = self.get_json(Service::Data, endpoint).await?;

        if chart.status != "success" {
            return Err(ClientError::Api {
                endpoint: endpoint.to_string(),
                message: chart
                    .message
                    .unwrap_or_else(|| format!("status '{}'", chart.status)),
            });
        }

        Ok(chart.data)
    }
}

/// Parse a base URL so that relative joins append to its path.
fn base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}

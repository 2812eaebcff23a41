//! Shared services built once at startup and handed to each command.

use std::sync::Arc;
use std::time::Duration;

use weatherlens_analytics::{CentroidStore, SeasonForecaster};
use weatherlens_client::{AnalyticsClient, ClientError, ClientSettings, RetryConfig};
use weatherlens_core::Config;

pub struct AppServices {
    config: Arc<Config>,
    client: Arc<AnalyticsClient>,
    centroids: Arc<CentroidStore>,
    forecaster: SeasonForecaster,
}

impl AppServices {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = Arc::new(AnalyticsClient::new(client_settings(&config))?);
        let centroids = Arc::new(CentroidStore::new(client.clone()));
        let forecaster = SeasonForecaster::new(client.clone(), centroids.clone());

        tracing::debug!(
            "Services ready (analytics: {}, data: {})",
            config.endpoints.analytics_url,
            config.endpoints.data_url
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            centroids,
            forecaster,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &AnalyticsClient {
        &self.client
    }

    pub fn centroids(&self) -> &CentroidStore {
        &self.centroids
    }

    pub fn forecaster(&self) -> &SeasonForecaster {
        &self.forecaster
    }
}

pub fn client_settings(config: &Config) -> ClientSettings {
    let retry = &config.client.retry;
    let retry = if retry.max_retries == 0 {
        RetryConfig::none()
    } else {
        RetryConfig::new(retry.max_retries, retry.initial_delay_ms, retry.max_delay_ms)
    };
    ClientSettings {
        analytics_url: config.endpoints.analytics_url.clone(),
        data_url: config.endpoints.data_url.clone(),
        timeout: Duration::from_secs(config.client.timeout_secs),
        retry,
    }
}

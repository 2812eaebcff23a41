//! Centroid state holder.
//!
//! Created once at startup and shared by reference; every `refresh` goes to
//! the network. The lock is never held across an await.

use std::sync::Arc;

use parking_lot::RwLock;
use weatherlens_client::{AnalyticsClient, Centroid};

use crate::error::ForecastError;

const INVALID_CENTROIDS: &str = "Invalid centroids data.";

/// Snapshot of the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentroidState {
    pub centroids: Vec<Centroid>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct CentroidStore {
    client: Arc<AnalyticsClient>,
    state: RwLock<CentroidState>,
}

impl CentroidStore {
    pub fn new(client: Arc<AnalyticsClient>) -> Self {
        Self {
            client,
            state: RwLock::new(CentroidState::default()),
        }
    }

    /// Fetch centroids and replace the stored list.
    ///
    /// On failure, or when the backend returns no centroids, the list is
    /// cleared and the error is recorded as well as returned.
    pub async fn refresh(&self) -> Result<Vec<Centroid>, ForecastError> {
        {
            let mut state = self.state.write();
            state.loading = true;
            state.error = None;
        }

        let result = match self.client.get_centroids().await {
            Ok(centroids) if centroids.is_empty() => Err(ForecastError::CentroidsUnavailable(
                INVALID_CENTROIDS.to_string(),
            )),
            Ok(centroids) => Ok(centroids),
            Err(e) => Err(ForecastError::Client(e)),
        };

        let mut state = self.state.write();
        state.loading = false;
        match &result {
            Ok(centroids) => {
                state.centroids = centroids.clone();
            }
            Err(e) => {
                tracing::error!("Error fetching centroids data: {}", e);
                state.centroids.clear();
                state.error = Some(e.to_string());
            }
        }

        result
    }

    pub fn snapshot(&self) -> CentroidState {
        self.state.read().clone()
    }

    pub fn centroids(&self) -> Vec<Centroid> {
        self.state.read().centroids.clone()
    }

    pub fn reset(&self) {
        *self.state.write() = CentroidState::default();
    }
}

//! Derived analytics on top of the backend client.
//!
//! `probability` is pure; `store` and `forecast` own the network side.

pub mod error;
pub mod forecast;
pub mod probability;
pub mod series;
pub mod store;

pub use error::{ForecastError, ProbabilityError};
pub use forecast::{SeasonForecast, SeasonForecaster};
pub use probability::{season_probabilities, try_season_probabilities, SeasonProbabilities};
pub use store::{CentroidState, CentroidStore};

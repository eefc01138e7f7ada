use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{Coordinates, PayloadError, PlaceReport, QueryOptions};

pub mod yahoo;

pub use yahoo::YahooPlaceClient;

/// Why a place-weather lookup produced no report.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to send place-weather request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("place-weather request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to read place-weather response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to parse place-weather JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Source of rainfall observations and forecasts for a single point.
#[async_trait]
pub trait PlaceWeatherSource: Send + Sync + Debug {
    async fn place_weather(
        &self,
        coordinates: &Coordinates,
        options: &QueryOptions,
    ) -> Result<PlaceReport, FetchError>;
}

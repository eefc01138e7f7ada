use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};

use crate::model::{Coordinates, PlaceReport, PlaceResponse, QueryOptions};

use super::{FetchError, PlaceWeatherSource};

/// Yahoo! JAPAN weather information API, place endpoint.
pub const PLACE_ENDPOINT: &str = "https://map.yahooapis.jp/weather/V1/place";

/// Identifying header sent with every request.
pub const CLIENT_USER_AGENT: &str = "weather-app/1.0";

#[derive(Debug, Clone)]
pub struct YahooPlaceClient {
    app_id: String,
    base_url: String,
    http: Client,
}

impl YahooPlaceClient {
    pub fn new(app_id: String) -> Self {
        Self::with_base_url(app_id, PLACE_ENDPOINT)
    }

    pub fn with_base_url(app_id: String, base_url: impl Into<String>) -> Self {
        Self {
            app_id,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Built-in parameters first; a caller option with the same key replaces the built-in value.
    fn query<'a>(
        &'a self,
        coordinates: &'a str,
        options: &'a QueryOptions,
    ) -> Vec<(&'a str, &'a str)> {
        let mut query = vec![
            ("appid", self.app_id.as_str()),
            ("coordinates", coordinates),
            ("output", "json"),
        ];

        for (key, value) in options.iter() {
            match query.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => query.push((key, value)),
            }
        }

        query
    }

    async fn fetch(
        &self,
        coordinates: &str,
        options: &QueryOptions,
    ) -> Result<PlaceReport, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&self.query(coordinates, options))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Body)?;

        tracing::debug!(%status, body = %truncate_body(&body), "place-weather response");

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: PlaceResponse = serde_json::from_str(&body)?;
        let report = PlaceReport::try_from(parsed)?;

        tracing::debug!(
            area_code = ?report.weather_area_code,
            geometry = ?report.geometry,
            entries = report.entries.len(),
            "parsed place report"
        );

        Ok(report)
    }
}

#[async_trait]
impl PlaceWeatherSource for YahooPlaceClient {
    async fn place_weather(
        &self,
        coordinates: &Coordinates,
        options: &QueryOptions,
    ) -> Result<PlaceReport, FetchError> {
        let coordinates = coordinates.to_query();

        let result = self.fetch(&coordinates, options).await;
        if let Err(err) = &result {
            tracing::warn!(%coordinates, error = %err, "Yahoo place-weather request failed");
        }

        result
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

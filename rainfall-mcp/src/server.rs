//! MCP tool server for the `get-rainfall` and `get-rainfall-past` tools.

use rainfall_core::{
    Coordinates, InputError, Labels, PastHours, PlaceWeatherSource, QueryOptions,
    format_rainfall, format_rainfall_past,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

pub const SERVER_NAME: &str = "get-rainfall";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RainfallParams {
    #[schemars(
        description = "Longitude of the location in Japan",
        range(min = 122, max = 154)
    )]
    pub longitude: f64,
    #[schemars(
        description = "Latitude of the location in Japan",
        range(min = 20, max = 46)
    )]
    pub latitude: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RainfallPastParams {
    #[schemars(
        description = "Longitude of the location in Japan",
        range(min = 122, max = 154)
    )]
    pub longitude: f64,
    #[schemars(
        description = "Latitude of the location in Japan",
        range(min = 20, max = 46)
    )]
    pub latitude: f64,
    #[schemars(description = "Hours of past data (1 or 2)", range(min = 1, max = 2))]
    pub past: i64,
}

#[derive(Clone)]
pub struct RainfallServer {
    source: Arc<dyn PlaceWeatherSource>,
    labels: &'static Labels,
    tool_router: ToolRouter<Self>,
}

impl RainfallServer {
    pub fn new(source: Arc<dyn PlaceWeatherSource>, labels: &'static Labels) -> Self {
        Self {
            source,
            labels,
            tool_router: Self::tool_router(),
        }
    }
}

fn invalid_params(err: InputError) -> McpError {
    tracing::debug!(error = %err, "rejecting tool input");
    McpError::invalid_params(err.to_string(), None)
}

#[tool_router]
impl RainfallServer {
    #[tool(
        name = "get-rainfall",
        description = "Get current and forecasted rainfall for a location in Japan"
    )]
    async fn get_rainfall(
        &self,
        Parameters(params): Parameters<RainfallParams>,
    ) -> Result<CallToolResult, McpError> {
        let coords = Coordinates::new(params.longitude, params.latitude).map_err(invalid_params)?;

        tracing::info!(%coords, "get-rainfall");

        let result = self
            .source
            .place_weather(&coords, &QueryOptions::new())
            .await;

        let text = format_rainfall(result.as_ref().ok(), &coords, self.labels);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "get-rainfall-past",
        description = "Get past rainfall data for a location in Japan"
    )]
    async fn get_rainfall_past(
        &self,
        Parameters(params): Parameters<RainfallPastParams>,
    ) -> Result<CallToolResult, McpError> {
        let coords = Coordinates::new(params.longitude, params.latitude).map_err(invalid_params)?;
        let past = PastHours::try_from(params.past).map_err(invalid_params)?;

        tracing::info!(%coords, %past, "get-rainfall-past");

        let result = self
            .source
            .place_weather(&coords, &QueryOptions::past(past))
            .await;

        let text = format_rainfall_past(result.as_ref().ok(), &coords, past, self.labels);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for RainfallServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(
            "Rainfall observations and forecasts for points in Japan, \
             from the Yahoo! JAPAN weather information API."
                .to_string(),
        );
        info
    }
}

//! Core library for the `rainfall-mcp` server.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The Yahoo! JAPAN place-weather client
//! - Typed models for coordinates and provider payloads
//! - Text formatting of rainfall reports
//!
//! It is used by `rainfall-mcp`, but can also be reused by other binaries or services.

pub mod config;
pub mod format;
pub mod model;
pub mod provider;

pub use config::{AppConfig, Config};
pub use format::{Labels, Language, format_rainfall, format_rainfall_past};
pub use model::{Coordinates, InputError, PastHours, PlaceReport, QueryOptions};
pub use provider::{FetchError, PlaceWeatherSource, YahooPlaceClient};

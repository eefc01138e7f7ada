use serde::Deserialize;
use std::{collections::BTreeMap, fmt, ops::RangeInclusive};
use thiserror::Error;

/// Longitudes covered by the Yahoo! JAPAN place-weather endpoint.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = 122.0..=154.0;
/// Latitudes covered by the Yahoo! JAPAN place-weather endpoint.
pub const LATITUDE_RANGE: RangeInclusive<f64> = 20.0..=46.0;

/// Rejected tool input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("longitude {0} is outside the supported range 122..=154")]
    LongitudeOutOfRange(f64),

    #[error("latitude {0} is outside the supported range 20..=46")]
    LatitudeOutOfRange(f64),

    #[error("past must be 1 or 2 hours, got {0}")]
    PastHoursOutOfRange(i64),
}

/// A validated point in Japan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    longitude: f64,
    latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InputError> {
        if !longitude.is_finite() || !LONGITUDE_RANGE.contains(&longitude) {
            return Err(InputError::LongitudeOutOfRange(longitude));
        }
        if !latitude.is_finite() || !LATITUDE_RANGE.contains(&latitude) {
            return Err(InputError::LatitudeOutOfRange(latitude));
        }

        Ok(Self { longitude, latitude })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// `"<lon>,<lat>"` with five fixed decimals, as the provider expects.
    pub fn to_query(&self) -> String {
        format!("{:.5},{:.5}", self.longitude, self.latitude)
    }
}

/// Renders the coordinates as the caller supplied them, e.g. `139.7, 35.68`.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.longitude, self.latitude)
    }
}

/// Hours of past observations to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PastHours {
    One,
    Two,
}

impl PastHours {
    pub fn hours(self) -> u8 {
        match self {
            PastHours::One => 1,
            PastHours::Two => 2,
        }
    }
}

impl TryFrom<i64> for PastHours {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PastHours::One),
            2 => Ok(PastHours::Two),
            other => Err(InputError::PastHoursOutOfRange(other)),
        }
    }
}

impl fmt::Display for PastHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hours())
    }
}

/// Extra query parameters merged into the outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions(BTreeMap<String, String>);

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn past(hours: PastHours) -> Self {
        let mut options = Self::new();
        options.insert("past", hours.to_string());
        options
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// Provider payload, as returned by `weather/V1/place?output=json`.
// Every field is optional and a value of the wrong type reads as absent:
// the shape is controlled by the provider.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaceResponse {
    #[serde(default, deserialize_with = "lenient::list_or_default")]
    pub feature: Option<Vec<RawFeature>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFeature {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub geometry: Option<RawGeometry>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub property: Option<RawProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGeometry {
    #[serde(default, rename = "Type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub coordinates: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawProperty {
    // Documented as a string but arrives as a number for some places.
    #[serde(default, deserialize_with = "lenient::text")]
    pub weather_area_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub weather_list: Option<RawWeatherList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawWeatherList {
    #[serde(default, deserialize_with = "lenient::list_skipping_invalid")]
    pub weather: Option<Vec<RawWeather>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawWeather {
    #[serde(default, rename = "Type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rainfall: Option<f64>,
}

/// Field deserializers that never fail on a wrongly typed value.
mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned};
    use serde_json::Value;

    pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Strings as is, numbers and booleans in their JSON spelling.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Numbers, or strings holding a finite number.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    /// Keeps every position: an element of the wrong shape becomes `T::default()`.
    pub fn list_or_default<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(array(deserializer)?.map(|items| {
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect()
        }))
    }

    /// Drops elements of the wrong shape.
    pub fn list_skipping_invalid<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(array(deserializer)?.map(|items| {
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect()
        }))
    }

    fn array<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(items),
            _ => None,
        })
    }
}

/// The payload could be parsed but carries nothing to report on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("response contained no Feature entries")]
    NoFeature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Observation,
    Forecast,
}

impl EntryKind {
    /// Only the literal `"observation"` tag counts as measured data.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("observation") => EntryKind::Observation,
            _ => EntryKind::Forecast,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherEntry {
    pub kind: EntryKind,
    /// `YYYYMMDDHHmm` when the provider follows its own format.
    pub date: Option<String>,
    /// Rainfall intensity in mm/h.
    pub rainfall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: Option<String>,
    pub coordinates: Option<String>,
}

/// The first Feature of a place-weather response, with optional fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceReport {
    pub name: Option<String>,
    pub geometry: Option<Geometry>,
    pub weather_area_code: Option<String>,
    /// Entries in provider order.
    pub entries: Vec<WeatherEntry>,
}

impl PlaceReport {
    pub fn observations(&self) -> impl Iterator<Item = &WeatherEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::Observation)
    }
}

impl TryFrom<PlaceResponse> for PlaceReport {
    type Error = PayloadError;

    fn try_from(response: PlaceResponse) -> Result<Self, Self::Error> {
        let feature = response
            .feature
            .and_then(|features| features.into_iter().next())
            .ok_or(PayloadError::NoFeature)?;

        let property = feature.property.unwrap_or_default();

        let entries = property
            .weather_list
            .and_then(|list| list.weather)
            .unwrap_or_default()
            .into_iter()
            .map(|raw| WeatherEntry {
                kind: EntryKind::from_tag(raw.kind.as_deref()),
                date: raw.date,
                rainfall: raw.rainfall,
            })
            .collect();

        Ok(PlaceReport {
            name: feature.name.filter(|name| !name.is_empty()),
            geometry: feature.geometry.map(|g| Geometry {
                kind: g.kind,
                coordinates: g.coordinates,
            }),
            weather_area_code: property.weather_area_code,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<PlaceReport, PayloadError> {
        let response: PlaceResponse = serde_json::from_value(value).expect("valid payload shape");
        PlaceReport::try_from(response)
    }

    #[test]
    fn coordinates_accept_bounds_inclusive() {
        assert!(Coordinates::new(122.0, 20.0).is_ok());
        assert!(Coordinates::new(154.0, 46.0).is_ok());
    }

    #[test]
    fn coordinates_reject_out_of_range_and_non_finite() {
        assert_eq!(
            Coordinates::new(121.9, 35.0),
            Err(InputError::LongitudeOutOfRange(121.9))
        );
        assert_eq!(
            Coordinates::new(139.0, 46.5),
            Err(InputError::LatitudeOutOfRange(46.5))
        );
        assert!(Coordinates::new(f64::NAN, 35.0).is_err());
        assert!(Coordinates::new(139.0, f64::INFINITY).is_err());
    }

    #[test]
    fn query_string_uses_five_fixed_decimals() {
        let coords = Coordinates::new(139.7, 35.6812345678).unwrap();
        assert_eq!(coords.to_query(), "139.70000,35.68123");

        let coords = Coordinates::new(122.0, 20.0).unwrap();
        assert_eq!(coords.to_query(), "122.00000,20.00000");
    }

    #[test]
    fn query_string_shape_over_the_whole_domain() {
        for lon in [122.0, 122.123456, 139.76, 150.5, 154.0] {
            for lat in [20.0, 26.2124, 35.681236, 43.06417, 46.0] {
                let query = Coordinates::new(lon, lat).unwrap().to_query();
                let (l, r) = query.split_once(',').expect("comma separated");
                for part in [l, r] {
                    let (int, frac) = part.split_once('.').expect("fixed point");
                    assert!(!int.is_empty() && int.chars().all(|c| c.is_ascii_digit()));
                    assert_eq!(frac.len(), 5);
                    assert!(frac.chars().all(|c| c.is_ascii_digit()));
                }
            }
        }
    }

    #[test]
    fn display_keeps_caller_precision() {
        let coords = Coordinates::new(139.7, 35.68).unwrap();
        assert_eq!(coords.to_string(), "139.7, 35.68");
    }

    #[test]
    fn past_hours_only_one_or_two() {
        assert_eq!(PastHours::try_from(1), Ok(PastHours::One));
        assert_eq!(PastHours::try_from(2), Ok(PastHours::Two));
        assert_eq!(
            PastHours::try_from(3),
            Err(InputError::PastHoursOutOfRange(3))
        );
        assert!(PastHours::try_from(0).is_err());
    }

    #[test]
    fn past_options_carry_hours_as_string() {
        let options = QueryOptions::past(PastHours::Two);
        assert_eq!(options.get("past"), Some("2"));
    }

    #[test]
    fn empty_or_missing_feature_list_is_an_error() {
        assert_eq!(parse(json!({})), Err(PayloadError::NoFeature));
        assert_eq!(parse(json!({ "Feature": [] })), Err(PayloadError::NoFeature));
    }

    #[test]
    fn only_first_feature_is_used() {
        let report = parse(json!({
            "Feature": [
                { "Name": "first" },
                { "Name": "second" }
            ]
        }))
        .unwrap();

        assert_eq!(report.name.as_deref(), Some("first"));
        assert!(report.entries.is_empty());
    }

    #[test]
    fn entries_keep_provider_order_and_tags() {
        let report = parse(json!({
            "ResultInfo": { "Count": 1 },
            "Feature": [{
                "Name": "地点(139.73229,35.663613)の雨の状況",
                "Geometry": { "Type": "point", "Coordinates": "139.73229,35.663613" },
                "Property": {
                    "WeatherAreaCode": 4410,
                    "WeatherList": {
                        "Weather": [
                            { "Type": "forecast", "Date": "202401021540", "Rainfall": 0.0 },
                            { "Type": "observation", "Date": "202401021530", "Rainfall": 1.5 },
                            { "Date": "202401021550" }
                        ]
                    }
                }
            }]
        }))
        .unwrap();

        assert_eq!(report.weather_area_code.as_deref(), Some("4410"));
        assert_eq!(
            report.geometry.as_ref().and_then(|g| g.coordinates.as_deref()),
            Some("139.73229,35.663613")
        );
        let kinds: Vec<_> = report.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Forecast, EntryKind::Observation, EntryKind::Forecast]
        );
        assert_eq!(report.entries[2].rainfall, None);
        assert_eq!(report.observations().count(), 1);
    }

    #[test]
    fn wrongly_typed_fields_read_as_absent_without_losing_other_entries() {
        let report = parse(json!({
            "Feature": [{
                "Name": 42,
                "Geometry": "point",
                "Property": {
                    "WeatherAreaCode": { "code": 4410 },
                    "WeatherList": {
                        "Weather": [
                            { "Type": "observation", "Date": "202401021530", "Rainfall": 1.5 },
                            { "Type": "observation", "Date": 202401021540_u64, "Rainfall": "2.25" },
                            { "Type": ["forecast"], "Date": null, "Rainfall": { "mm": 3 } },
                            null,
                            "garbage"
                        ]
                    }
                }
            }]
        }))
        .unwrap();

        assert_eq!(report.name.as_deref(), Some("42"));
        assert_eq!(report.geometry, None);
        assert_eq!(report.weather_area_code, None);
        assert_eq!(
            report.entries,
            vec![
                WeatherEntry {
                    kind: EntryKind::Observation,
                    date: Some("202401021530".into()),
                    rainfall: Some(1.5),
                },
                WeatherEntry {
                    kind: EntryKind::Observation,
                    date: Some("202401021540".into()),
                    rainfall: Some(2.25),
                },
                WeatherEntry {
                    kind: EntryKind::Forecast,
                    date: None,
                    rainfall: None,
                },
            ]
        );
    }

    #[test]
    fn malformed_body_still_parses_from_text() {
        let body = r#"{"Feature":[{"Property":{"WeatherList":{"Weather":[
            {"Type":"observation","Date":"202401021530","Rainfall":"abc"},
            {"Type":"forecast","Date":"202401021540","Rainfall":0.5}
        ]}}}]}"#;

        let response: PlaceResponse = serde_json::from_str(body).unwrap();
        let report = PlaceReport::try_from(response).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].rainfall, None);
        assert_eq!(report.entries[1].rainfall, Some(0.5));
    }

    #[test]
    fn null_first_feature_is_kept_as_empty() {
        let report = parse(json!({ "Feature": [null, { "Name": "second" }] })).unwrap();

        assert_eq!(report.name, None);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn feature_that_is_not_a_list_counts_as_missing() {
        assert_eq!(
            parse(json!({ "Feature": { "Name": "x" } })),
            Err(PayloadError::NoFeature)
        );
    }

    #[test]
    fn blank_name_is_treated_as_missing() {
        let report = parse(json!({ "Feature": [{ "Name": "" }] })).unwrap();
        assert_eq!(report.name, None);
    }
}

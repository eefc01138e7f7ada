//! Turns a place-weather report into the text returned by the tools.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::model::{Coordinates, EntryKind, PastHours, PlaceReport, WeatherEntry};

/// Placeholder for a missing date or rainfall value.
pub const UNKNOWN: &str = "Unknown";

/// Output language for labels and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::Ja, Language::En]
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::Ja => &JA,
            Language::En => &EN,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown language '{0}'. Supported languages: ja, en.")]
pub struct UnknownLanguage(String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ja" | "japanese" => Ok(Language::Ja),
            "en" | "english" => Ok(Language::En),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Per-language wording of the rendered text.
#[derive(Debug, PartialEq, Eq)]
pub struct Labels {
    language: Language,
    pub observed: &'static str,
    pub forecast: &'static str,
    pub rainfall: &'static str,
    coordinates: &'static str,
}

impl Labels {
    /// Fallback location label when the provider gives no name.
    pub fn coordinates_label(&self, coords: &Coordinates) -> String {
        format!("{}({coords})", self.coordinates)
    }

    pub fn header(&self, location: &str) -> String {
        match self.language {
            Language::Ja => format!("{location}の降水情報:"),
            Language::En => format!("Rainfall for {location}:"),
        }
    }

    pub fn past_header(&self, location: &str, past: PastHours) -> String {
        match (self.language, past) {
            (Language::Ja, _) => format!("{location}の過去{past}時間の降水情報:"),
            (Language::En, PastHours::One) => format!("Past 1 hour of rainfall for {location}:"),
            (Language::En, PastHours::Two) => format!("Past 2 hours of rainfall for {location}:"),
        }
    }

    /// Renders a provider timestamp in this language's date style.
    pub fn date(&self, date: &str) -> String {
        match self.language {
            Language::Ja => format_date(date),
            Language::En => format_date_iso(date),
        }
    }

    fn kind(&self, kind: EntryKind) -> &'static str {
        match kind {
            EntryKind::Observation => self.observed,
            EntryKind::Forecast => self.forecast,
        }
    }
}

static JA: Labels = Labels {
    language: Language::Ja,
    observed: "観測値",
    forecast: "予測値",
    rainfall: "降水強度",
    coordinates: "座標",
};

static EN: Labels = Labels {
    language: Language::En,
    observed: "observed",
    forecast: "forecast",
    rainfall: "Rainfall",
    coordinates: "Coordinates",
};

/// `YYYYMMDDHHmm` → `YYYY年MM月DD日 HH:mm`; anything else is returned as is.
pub fn format_date(date: &str) -> String {
    match split_timestamp(date) {
        Some([year, month, day, hour, minute]) => {
            format!("{year}年{month}月{day}日 {hour}:{minute}")
        }
        None => date.to_string(),
    }
}

/// Year, month, day, hour and minute of a 12-character timestamp.
fn split_timestamp(date: &str) -> Option<[String; 5]> {
    let chars: Vec<char> = date.chars().collect();
    if chars.len() != 12 {
        return None;
    }

    let part = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    Some([part(0, 4), part(4, 6), part(6, 8), part(8, 10), part(10, 12)])
}

/// `YYYYMMDDHHmm` → `YYYY-MM-DD HH:mm`; anything else is returned as is.
pub fn format_date_iso(date: &str) -> String {
    match split_timestamp(date) {
        Some([year, month, day, hour, minute]) => {
            format!("{year}-{month}-{day} {hour}:{minute}")
        }
        None => date.to_string(),
    }
}

fn entry_date(entry: &WeatherEntry, labels: &Labels) -> String {
    entry
        .date
        .as_deref()
        .map(|date| labels.date(date))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn entry_rainfall(entry: &WeatherEntry) -> String {
    entry
        .rainfall
        .map(|value| value.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn location_label(report: &PlaceReport, coords: &Coordinates, labels: &Labels) -> String {
    report
        .name
        .clone()
        .unwrap_or_else(|| labels.coordinates_label(coords))
}

/// Text for `get-rainfall`: every entry, observed and forecast, in provider order.
///
/// `None` stands for a failed fetch.
pub fn format_rainfall(
    report: Option<&PlaceReport>,
    coords: &Coordinates,
    labels: &Labels,
) -> String {
    let Some(report) = report else {
        return format!("Failed to retrieve weather data for coordinates: {coords}");
    };

    if report.entries.is_empty() {
        return format!("No weather data available for {coords}");
    }

    let lines: Vec<String> = report
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{} ({}): {} {} mm/h",
                entry_date(entry, labels),
                labels.kind(entry.kind),
                labels.rainfall,
                entry_rainfall(entry)
            )
        })
        .collect();

    let location = location_label(report, coords, labels);
    format!("{}\n\n{}", labels.header(&location), lines.join("\n"))
}

/// Text for `get-rainfall-past`: observations only.
///
/// A report whose entries are all forecasts still renders the header, followed
/// by no lines.
pub fn format_rainfall_past(
    report: Option<&PlaceReport>,
    coords: &Coordinates,
    past: PastHours,
    labels: &Labels,
) -> String {
    let Some(report) = report else {
        return format!("Failed to retrieve past weather data for coordinates: {coords}");
    };

    if report.entries.is_empty() {
        return format!("No past weather data available for {coords}");
    }

    let lines: Vec<String> = report
        .observations()
        .map(|entry| {
            format!(
                "{}: {} {} mm/h",
                entry_date(entry, labels),
                labels.rainfall,
                entry_rainfall(entry)
            )
        })
        .collect();

    let location = location_label(report, coords, labels);
    format!(
        "{}\n\n{}",
        labels.past_header(&location, past),
        lines.join("\n")
    )
}

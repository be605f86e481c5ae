//! NASA POWER daily projection lookup, reshaped into a display table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::{DatedReading, PagedTables, ParameterTable, TableCell, TableRow};

use crate::upstream::{UpstreamClient, UpstreamError};

pub const DEFAULT_MODEL: &str = "ensemble";
pub const DEFAULT_SCENARIO: &str = "ssp126";
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Requested parameters in table order: (NASA key, label, unit).
pub const PARAMETERS: [(&str, &str, &str); 9] = [
    ("T2M", "Temperature", "°C"),
    ("T2M_MAX", "Max Temperature", "°C"),
    ("T2M_MIN", "Min Temperature", "°C"),
    ("PRECTOTCORR", "Precipitation", "mm"),
    ("QV2M", "Specific Humidity", "g/kg"),
    ("RH2M", "Relative Humidity", "%"),
    ("WS10M", "Wind Speed", "m/s"),
    ("ALLSKY_SFC_SW_DWN", "Shortwave Irradiance", "W/m²"),
    ("ALLSKY_SFC_LW_DWN", "Longwave Irradiance", "W/m²"),
];

/// Readings keyed by parameter, then by `YYYYMMDD` date.
pub type ParameterSeries = BTreeMap<String, BTreeMap<String, Option<f64>>>;

pub fn unit_for(key: &str) -> &'static str {
    PARAMETERS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, unit)| *unit)
        .unwrap_or_default()
}

/// Accepts `YYYY-MM-DD`, ignoring anything after the tenth character.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    let bytes = day.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn display_date(compact: &str) -> String {
    NaiveDate::parse_from_str(compact, "%Y%m%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| compact.to_string())
}

/// Pulls `properties.parameter` out of a POWER response; absent means empty.
/// A series that fails to decode is dropped on its own.
pub fn parameter_series(raw: &serde_json::Value) -> ParameterSeries {
    let Some(parameters) = raw
        .pointer("/properties/parameter")
        .and_then(serde_json::Value::as_object)
    else {
        return ParameterSeries::new();
    };

    parameters
        .iter()
        .filter_map(|(key, readings)| {
            match serde_json::from_value::<BTreeMap<String, Option<f64>>>(readings.clone()) {
                Ok(by_date) => Some((key.clone(), by_date)),
                Err(err) => {
                    tracing::warn!("dropping NASA POWER series {key}: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Dates of the first parameter, in table order, present in the series.
fn series_dates(series: &ParameterSeries) -> Vec<&String> {
    PARAMETERS
        .iter()
        .find_map(|(key, _, _)| series.get(*key))
        .or_else(|| series.values().next())
        .map(|by_date| by_date.keys().collect())
        .unwrap_or_default()
}

fn reading(series: &ParameterSeries, key: &str, date: &str) -> Option<f64> {
    series.get(key).and_then(|r| r.get(date).copied().flatten())
}

/// Header row of dates followed by one row per parameter, no conversion.
pub fn weather_table(series: &ParameterSeries) -> Vec<TableRow> {
    let dates = series_dates(series);

    let mut table = Vec::with_capacity(PARAMETERS.len() + 1);
    table.push(TableRow {
        label: "Parameter".into(),
        values: dates
            .iter()
            .map(|date| TableCell::Date(display_date(date)))
            .collect(),
        unit: "Unit".into(),
    });

    for (key, label, _) in PARAMETERS {
        table.push(TableRow {
            label: label.into(),
            values: dates
                .iter()
                .map(|date| TableCell::Value(reading(series, key, date)))
                .collect(),
            unit: unit_for(key).into(),
        });
    }

    table
}

/// One table per parameter over a 1-based page of dates. Pages past the
/// end hold empty tables.
pub fn paged_tables(series: &ParameterSeries, page: usize, page_size: usize) -> PagedTables {
    let dates = series_dates(series);
    let window: Vec<&String> = dates
        .iter()
        .skip(page.saturating_sub(1).saturating_mul(page_size))
        .take(page_size)
        .copied()
        .collect();

    let tables = PARAMETERS
        .iter()
        .map(|(key, label, unit)| ParameterTable {
            key: key.to_string(),
            label: label.to_string(),
            unit: unit.to_string(),
            rows: window
                .iter()
                .map(|date| DatedReading {
                    date: display_date(date),
                    value: reading(series, key, date),
                })
                .collect(),
        })
        .collect();

    PagedTables {
        page,
        page_size,
        total: dates.len(),
        tables,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointWeatherRequest {
    pub lat: f64,
    pub lng: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub model: String,
    pub scenario: String,
}

pub async fn fetch_point_weather(
    client: &UpstreamClient,
    req: &PointWeatherRequest,
) -> Result<serde_json::Value, UpstreamError> {
    let config = client.config();
    let url = format!(
        "{}/api/projection/daily/point",
        config.nasa_power_url.trim_end_matches('/')
    );
    let parameters = PARAMETERS
        .iter()
        .map(|(key, _, _)| *key)
        .collect::<Vec<_>>()
        .join(",");
    let start = req.start.format("%Y%m%d").to_string();
    let end = req.end.format("%Y%m%d").to_string();
    let latitude = req.lat.to_string();
    let longitude = req.lng.to_string();

    tracing::debug!("requesting NASA POWER data {start}..{end} at ({latitude}, {longitude})");

    client
        .get_json(
            url,
            &[
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("community", "ag"),
                ("parameters", parameters.as_str()),
                ("format", "JSON"),
                ("user", "horuscast"),
                ("header", "true"),
                ("time-standard", "utc"),
                ("model", req.model.as_str()),
                ("scenario", req.scenario.as_str()),
            ],
        )
        .await
}

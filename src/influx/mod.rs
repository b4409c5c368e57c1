//! InfluxDB v2 query boundary.
//!
//! Thin REST client for the `/api/v2/query` endpoint. Flux returns results in
//! annotated CSV with one "tall" record per (time, field, value); this module
//! reshapes them into "wide" [`WeatherPoint`]s, one object per timestamp,
//! sorted ascending by time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Error types for time-series queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InfluxError {
    #[error("network error: {0}")]
    Http(String),
    #[error("InfluxDB returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed query response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

/// Wide-format record: one object per timestamp carrying every field reported
/// at that instant. Fields the measurement did not report are omitted from
/// the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherPoint {
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tof: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(rename = "accX", skip_serializing_if = "Option::is_none")]
    pub acc_x: Option<f64>,
    #[serde(rename = "accY", skip_serializing_if = "Option::is_none")]
    pub acc_y: Option<f64>,
    #[serde(rename = "accZ", skip_serializing_if = "Option::is_none")]
    pub acc_z: Option<f64>,
    #[serde(rename = "vibrAccX", skip_serializing_if = "Option::is_none")]
    pub vibr_acc_x: Option<f64>,
    #[serde(rename = "vibrAccY", skip_serializing_if = "Option::is_none")]
    pub vibr_acc_y: Option<f64>,
    #[serde(rename = "vibrAccZ", skip_serializing_if = "Option::is_none")]
    pub vibr_acc_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forcast: Option<String>,
}

impl WeatherPoint {
    fn at(time: DateTime<Utc>) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Assign one tall record's value onto the wide point.
    fn set_field(&mut self, field: &str, value: &str) {
        match field {
            "device_id" => self.device_id = value.parse().ok(),
            "temperature" => self.temperature = value.parse().ok(),
            "humidity" => self.humidity = value.parse().ok(),
            "pressure" => self.pressure = value.parse().ok(),
            "light" => self.light = value.parse().ok(),
            "noise" => self.noise = value.parse().ok(),
            "tof" => self.tof = value.parse().ok(),
            "angle" => self.angle = value.parse().ok(),
            "accX" => self.acc_x = value.parse().ok(),
            "accY" => self.acc_y = value.parse().ok(),
            "accZ" => self.acc_z = value.parse().ok(),
            "vibrAccX" => self.vibr_acc_x = value.parse().ok(),
            "vibrAccY" => self.vibr_acc_y = value.parse().ok(),
            "vibrAccZ" => self.vibr_acc_z = value.parse().ok(),
            "latitude" => self.latitude = value.parse().ok(),
            "longitude" => self.longitude = value.parse().ok(),
            "forcast" => self.forcast = Some(value.to_string()),
            other => debug!("ignoring unknown field '{other}'"),
        }
    }
}

pub struct InfluxClient {
    config: InfluxConfig,
    client: reqwest::Client,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch every field of `measurement` reported in the last `minutes`
    /// minutes, reshaped wide and sorted ascending by time.
    pub async fn query_range(
        &self,
        minutes: i64,
        measurement: &str,
    ) -> Result<Vec<WeatherPoint>, InfluxError> {
        let flux = format!(
            "from(bucket: \"{bucket}\")\n\
             \x20 |> range(start: -{minutes}m)\n\
             \x20 |> filter(fn: (r) => r._measurement == \"{measurement}\")\n\
             \x20 |> keep(columns: [\"_time\",\"_field\",\"_value\"])",
            bucket = self.config.bucket,
        );

        debug!(minutes, measurement, "running flux range query");

        let url = format!(
            "{}/api/v2/query?org={}",
            self.config.url.trim_end_matches('/'),
            self.config.org
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(flux)
            .send()
            .await
            .map_err(|e| InfluxError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InfluxError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(InfluxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        pivot_annotated_csv(&body)
    }
}

/// Parse an annotated-CSV query result and pivot tall records into wide
/// points. A `BTreeMap` keyed by timestamp gives the ascending sort for free.
fn pivot_annotated_csv(body: &str) -> Result<Vec<WeatherPoint>, InfluxError> {
    let mut columns: Option<(usize, usize, usize)> = None;
    let mut by_time: BTreeMap<DateTime<Utc>, WeatherPoint> = BTreeMap::new();

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cells = split_csv_line(line);

        // Each result table repeats its header row; recompute indexes when
        // one appears.
        if cells.iter().any(|c| c == "_time") {
            let index = |name: &str| cells.iter().position(|c| c == name);
            columns = match (index("_time"), index("_field"), index("_value")) {
                (Some(t), Some(f), Some(v)) => Some((t, f, v)),
                _ => {
                    return Err(InfluxError::Parse(format!(
                        "header row missing _time/_field/_value: {line}"
                    )))
                }
            };
            continue;
        }

        let Some((time_idx, field_idx, value_idx)) = columns else {
            return Err(InfluxError::Parse("data row before header row".to_string()));
        };
        let (Some(time), Some(field), Some(value)) = (
            cells.get(time_idx),
            cells.get(field_idx),
            cells.get(value_idx),
        ) else {
            continue;
        };

        let timestamp = DateTime::parse_from_rfc3339(time)
            .map_err(|e| InfluxError::Parse(format!("bad timestamp '{time}': {e}")))?
            .with_timezone(&Utc);

        by_time
            .entry(timestamp)
            .or_insert_with(|| WeatherPoint::at(timestamp))
            .set_field(field, value);
    }

    Ok(by_time.into_values().collect())
}

/// Minimal CSV field splitter: handles double-quoted cells with embedded
/// commas, which is all the query API emits for our field set.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

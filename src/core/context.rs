//! Sensor context formatting.
//!
//! Turns the raw `device_data` form field (a JSON array of per-device
//! readings) into the localized text block embedded in the assistant's system
//! instruction. Malformed telemetry degrades to a placeholder so the
//! assistant stays responsive; nothing here can fail the request.

use serde_json::{Map, Value};

use crate::core::locale::Locale;

/// One device reading as uploaded by the frontend.
///
/// Every field is optional; absence means the device did not report it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    pub device_id: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub light: Option<f64>,
    pub noise: Option<f64>,
    pub tof: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<String>,
}

impl SensorReading {
    /// Extract a reading from one array element.
    ///
    /// Returns `None` for anything that is not a JSON object; such elements
    /// are skipped rather than failing the whole payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            device_id: identifier(obj, "device_id"),
            temperature: number(obj, "temperature"),
            humidity: number(obj, "humidity"),
            pressure: number(obj, "pressure"),
            light: number(obj, "light"),
            noise: number(obj, "noise"),
            tof: number(obj, "tof"),
            latitude: number(obj, "latitude"),
            longitude: number(obj, "longitude"),
            time: obj.get("time").and_then(Value::as_str).map(str::to_string),
        })
    }
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// Device ids arrive as strings or bare numbers depending on the firmware.
fn identifier(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build the localized sensor context block.
///
/// Pure function of its inputs: no side effects beyond a `warn` log when the
/// payload is malformed.
pub fn build_sensor_context(device_data: Option<&str>, locale: &Locale) -> String {
    let Some(raw) = device_data.map(str::trim).filter(|s| !s.is_empty()) else {
        return with_header(locale, locale.no_data);
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("device_data is not valid JSON: {e}");
            return with_header(locale, locale.parse_error);
        }
    };

    let Some(items) = parsed.as_array() else {
        tracing::warn!("device_data is valid JSON but not an array");
        return with_header(locale, locale.invalid_format);
    };

    let blocks: Vec<String> = items
        .iter()
        .filter_map(SensorReading::from_value)
        .map(|reading| format_reading(&reading, locale))
        .collect();

    if blocks.is_empty() {
        return with_header(locale, locale.no_readings);
    }

    format!("{}\n{}", locale.data_header, blocks.join("\n\n"))
}

fn with_header(locale: &Locale, placeholder: &str) -> String {
    format!("{}\n{}", locale.data_header, placeholder)
}

fn format_reading(reading: &SensorReading, locale: &Locale) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{}: {}",
        locale.device_label,
        reading.device_id.as_deref().unwrap_or("-")
    ));
    if let Some(t) = reading.temperature {
        lines.push(format!("{}: {:.1}°C", locale.temperature_label, t));
    }
    if let Some(h) = reading.humidity {
        lines.push(format!("{}: {}%", locale.humidity_label, h));
    }
    if let Some(p) = reading.pressure {
        lines.push(format!("{}: {:.1} hPa", locale.pressure_label, p));
    }
    if let Some(l) = reading.light {
        lines.push(format!("{}: {} lux", locale.light_label, l));
    }
    if let Some(n) = reading.noise {
        lines.push(format!("{}: {} dB", locale.noise_label, n));
    }
    if let Some(d) = reading.tof {
        lines.push(format!("{}: {} mm", locale.tof_label, d));
    }
    if let (Some(lat), Some(lon)) = (reading.latitude, reading.longitude) {
        lines.push(format!("{}: {:.5}, {:.5}", locale.position_label, lat, lon));
    }
    if let Some(time) = &reading.time {
        lines.push(format!("{}: {}", locale.time_label, time));
    }
    lines.join("\n")
}

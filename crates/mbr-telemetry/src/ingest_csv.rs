//! CSV ingestion for tank telemetry and the tank catalog.
//!
//! ## Samples CSV (case-insensitive, order-independent columns)
//!
//! | Column      | Example                | Notes                                   |
//! |-------------|------------------------|-----------------------------------------|
//! | `tank_id`   | `TK-101`               |                                         |
//! | `timestamp` | `2024-06-01T00:00:00Z` | RFC 3339                                |
//! | `key`       | `volume`               | see [`TelemetryKey::parse`]             |
//! | `value`     | `10250.5`              | liters, kilograms or degrees Celsius    |
//!
//! Rows with an unparseable timestamp, value or key are skipped and counted as
//! rejected. Only structural / header errors are returned as `Err`.
//!
//! ## Tanks CSV
//!
//! `tank_id`, `tank_name` required; `product_type` optional. A blank
//! `tank_id` is a hard error: the catalog is the identity of record.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, Utc};
use mbr_balance::{Sample, TankInfo, TankSeries};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TelemetryError;
use crate::source::InMemoryTelemetry;

/// Which series a telemetry row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKey {
    Volume,
    Mass,
    Temperature,
}

impl TelemetryKey {
    /// `volume`/`volume_l`, `mass`/`mass_kg`, `temperature`/`temperature_c`
    /// (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "volume" | "volume_l" => Some(TelemetryKey::Volume),
            "mass" | "mass_kg" => Some(TelemetryKey::Mass),
            "temperature" | "temperature_c" => Some(TelemetryKey::Temperature),
            _ => None,
        }
    }
}

/// Result of a samples ingest: per-tank series plus row accounting.
#[derive(Debug, Clone, Default)]
pub struct SampleIngest {
    pub series: BTreeMap<String, TankSeries>,
    pub rows_read: usize,
    pub rows_rejected: usize,
}

impl SampleIngest {
    pub fn into_telemetry(self) -> InMemoryTelemetry {
        InMemoryTelemetry::new(self.series)
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

pub fn parse_samples_csv(path: &Path) -> Result<SampleIngest, TelemetryError> {
    let src = read_file(path)?;
    parse_samples_csv_str(&src)
}

pub fn parse_samples_csv_str(src: &str) -> Result<SampleIngest, TelemetryError> {
    let mut rdr = reader(src);
    let cols = build_col_index(rdr.headers()?, &["tank_id", "timestamp", "key", "value"])?;

    let mut out = SampleIngest::default();

    for (i, rec) in rdr.records().enumerate() {
        // 1-based, header = row 1
        let row = i + 2;
        let rec = rec?;
        out.rows_read += 1;

        let field = |name: &str| rec.get(cols[name]).unwrap_or("");

        let tank_id = field("tank_id");
        if tank_id.is_empty() {
            warn!(row, "telemetry row skipped: blank tank_id");
            out.rows_rejected += 1;
            continue;
        }

        let timestamp = match field("timestamp").parse::<DateTime<Utc>>() {
            Ok(ts) => ts,
            Err(_) => {
                warn!(row, raw = field("timestamp"), "telemetry row skipped: bad timestamp");
                out.rows_rejected += 1;
                continue;
            }
        };

        let value = match field("value").parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(row, raw = field("value"), "telemetry row skipped: bad value");
                out.rows_rejected += 1;
                continue;
            }
        };

        let key = match TelemetryKey::parse(field("key")) {
            Some(k) => k,
            None => {
                warn!(row, raw = field("key"), "telemetry row skipped: unknown key");
                out.rows_rejected += 1;
                continue;
            }
        };

        let series = out.series.entry(tank_id.to_string()).or_default();
        let sample = Sample::new(timestamp, value);
        match key {
            TelemetryKey::Volume => series.volume_l.push(sample),
            TelemetryKey::Mass => series.mass_kg.push(sample),
            TelemetryKey::Temperature => series.temperature_c.push(sample),
        }
    }

    // Input order need not be chronological.
    out.series = out
        .series
        .into_iter()
        .map(|(id, s)| (id, s.sorted()))
        .collect();

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tanks
// ---------------------------------------------------------------------------

pub fn parse_tanks_csv(path: &Path) -> Result<Vec<TankInfo>, TelemetryError> {
    let src = read_file(path)?;
    parse_tanks_csv_str(&src)
}

pub fn parse_tanks_csv_str(src: &str) -> Result<Vec<TankInfo>, TelemetryError> {
    let mut rdr = reader(src);
    let cols = build_col_index(rdr.headers()?, &["tank_id", "tank_name"])?;
    let product_col = cols.get("product_type").copied();

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let row = i + 2;
        let rec = rec?;

        let tank_id = rec.get(cols["tank_id"]).unwrap_or("");
        if tank_id.is_empty() {
            return Err(TelemetryError::ParseField {
                row,
                field: "tank_id",
                raw: String::new(),
            });
        }
        let tank_name = rec.get(cols["tank_name"]).unwrap_or("");
        let product_type = product_col.and_then(|c| rec.get(c)).unwrap_or("");

        out.push(TankInfo::new(tank_id, tank_name, product_type));
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, TelemetryError> {
    std::fs::read_to_string(path)
        .map_err(|e| TelemetryError::Io(format!("read '{}': {e}", path.display())))
}

fn reader(src: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(src.as_bytes())
}

/// Case-insensitive column-name -> index map; every `required` column must be present.
fn build_col_index(
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>, TelemetryError> {
    let idx: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, col)| (col.trim().to_ascii_lowercase(), i))
        .collect();

    for req in required {
        if !idx.contains_key(*req) {
            return Err(TelemetryError::MissingHeader(req.to_string()));
        }
    }

    Ok(idx)
}

//! Telemetry source boundary.

use std::collections::BTreeMap;

use mbr_balance::{Period, Sample, TankSeries};

use crate::error::TelemetryError;

/// Upstream tank-gauging telemetry contract.
///
/// Object-safe and `Send + Sync` so a run can share one source across
/// per-tank tasks behind an `Arc<dyn TelemetrySource>`.
pub trait TelemetrySource: Send + Sync {
    /// Human-readable name identifying this source (e.g. `"csv"`).
    fn name(&self) -> &'static str;

    /// Every sample of `tank_id` up to and including `window.end`, sorted by
    /// timestamp.
    ///
    /// History before `window.start` is kept so the opening snapshot can fall
    /// back to the nearest prior sample. An empty series is a valid result
    /// (no activity); a tank the source knows nothing about is
    /// [`TelemetryError::DataUnavailable`].
    fn fetch_series(&self, tank_id: &str, window: &Period) -> Result<TankSeries, TelemetryError>;
}

/// Series held in memory, keyed by tank id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTelemetry {
    series: BTreeMap<String, TankSeries>,
}

impl InMemoryTelemetry {
    pub fn new(series: BTreeMap<String, TankSeries>) -> Self {
        Self { series }
    }

    pub fn insert(&mut self, tank_id: impl Into<String>, series: TankSeries) {
        self.series.insert(tank_id.into(), series);
    }

    pub fn tank_ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

fn up_to(samples: &[Sample], window: &Period) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| s.timestamp <= window.end)
        .copied()
        .collect()
}

impl TelemetrySource for InMemoryTelemetry {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    fn fetch_series(&self, tank_id: &str, window: &Period) -> Result<TankSeries, TelemetryError> {
        let s = self
            .series
            .get(tank_id)
            .ok_or_else(|| TelemetryError::DataUnavailable {
                tank_id: tank_id.to_string(),
                reason: "no telemetry recorded".to_string(),
            })?;

        Ok(TankSeries {
            volume_l: up_to(&s.volume_l, window),
            mass_kg: up_to(&s.mass_kg, window),
            temperature_c: up_to(&s.temperature_c, window),
        }
        .sorted())
    }
}

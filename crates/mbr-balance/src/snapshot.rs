use chrono::{DateTime, Utc};

use crate::types::{Sample, SnapshotSource, StockSnapshot, TankSeries};

/// Latest sample with `timestamp <= at`. Ties on timestamp resolve to the
/// last one in input order.
pub(crate) fn latest_at_or_before(samples: &[Sample], at: DateTime<Utc>) -> Option<&Sample> {
    samples
        .iter()
        .filter(|s| s.timestamp <= at)
        .max_by_key(|s| s.timestamp)
}

/// Resolve a boundary snapshot from the volume and mass series.
///
/// Each dimension resolves independently to its nearest sample at or before
/// `at`. The snapshot is stamped with `at`, not with the sample times.
/// A dimension with no usable sample contributes `0`.
pub fn resolve_snapshot(series: &TankSeries, at: DateTime<Utc>) -> StockSnapshot {
    let volume = latest_at_or_before(&series.volume_l, at);
    let mass = latest_at_or_before(&series.mass_kg, at);

    let source = match (volume, mass) {
        (None, None) => return StockSnapshot::unavailable(at),
        (Some(v), Some(m)) if v.timestamp == at && m.timestamp == at => SnapshotSource::Exact,
        _ => SnapshotSource::PriorSample,
    };

    StockSnapshot {
        timestamp: at,
        volume_l: volume.map(|s| s.value).unwrap_or(0.0),
        mass_kg: mass.map(|s| s.value).unwrap_or(0.0),
        source,
    }
}

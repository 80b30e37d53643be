use crate::config::Thresholds;
use crate::types::DiscrepancyStatus;

/// `|discrepancy| / expected * 100`, or `0` when `expected <= 0`.
///
/// Always non-negative. Non-finite input collapses to `0` so downstream
/// classification never sees NaN.
pub fn discrepancy_pct(discrepancy: f64, expected: f64) -> f64 {
    if expected > 0.0 {
        let pct = discrepancy.abs() / expected * 100.0;
        if pct.is_finite() {
            return pct;
        }
    }
    0.0
}

/// Shared threshold rule for tanks and the fleet.
///
/// Boundaries are inclusive on the lower bucket: exactly `acceptable_pct`
/// is acceptable, exactly `warning_pct` is warning.
pub fn classify_status(
    thresholds: &Thresholds,
    volume_pct: f64,
    mass_pct: f64,
) -> DiscrepancyStatus {
    let worst = volume_pct.max(mass_pct);
    if worst <= thresholds.acceptable_pct {
        DiscrepancyStatus::Acceptable
    } else if worst <= thresholds.warning_pct {
        DiscrepancyStatus::Warning
    } else {
        DiscrepancyStatus::Critical
    }
}

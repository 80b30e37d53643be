use crate::aggregate::aggregate;
use crate::analyzer::detect_discrepancies;
use crate::config::BalanceConfig;
use crate::statistics::summarize;
use crate::types::{MassBalanceReport, TankBalance};

/// Fan-in step of a run: every per-tank balance is complete before this is
/// called.
///
/// Tanks are ordered by `tank_id` (stable) first, so the report does not
/// depend on the order in which per-tank computations finished.
pub fn reconcile_fleet(config: &BalanceConfig, mut tanks: Vec<TankBalance>) -> MassBalanceReport {
    tanks.sort_by(|a, b| a.tank_id.cmp(&b.tank_id));

    let global = aggregate(&config.thresholds, &tanks);
    let discrepancies = detect_discrepancies(&config.thresholds, &config.analysis, &tanks);
    let statistics = summarize(&config.thresholds, &tanks, &global);

    MassBalanceReport {
        tanks,
        global,
        discrepancies,
        statistics,
    }
}

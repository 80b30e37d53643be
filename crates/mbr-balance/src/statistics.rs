use crate::config::Thresholds;
use crate::types::{DiscrepancyStatus, GlobalBalance, MassBalanceStatistics, TankBalance};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn max_or_zero(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

/// Distribution metrics over every tank balance of a run.
///
/// Transaction totals and net change come from the fleet balance; counts,
/// means and maxima from the tank list. Zero tanks give an all-zero,
/// compliant summary.
pub fn summarize(
    thresholds: &Thresholds,
    tanks: &[TankBalance],
    global: &GlobalBalance,
) -> MassBalanceStatistics {
    let count = |s: DiscrepancyStatus| tanks.iter().filter(|t| t.status == s).count();

    let volume_pcts: Vec<f64> = tanks.iter().map(|t| t.volume_discrepancy_pct).collect();
    let mass_pcts: Vec<f64> = tanks.iter().map(|t| t.mass_discrepancy_pct).collect();

    let max_volume = max_or_zero(&volume_pcts);
    let max_mass = max_or_zero(&mass_pcts);

    let compliant =
        max_volume <= thresholds.acceptable_pct && max_mass <= thresholds.acceptable_pct;

    let compliance_note = if compliant {
        format!(
            "Compliant with API MPMS Chapter 13.1: all tank discrepancies within {:.2}% tolerance",
            thresholds.acceptable_pct
        )
    } else {
        format!(
            "Not compliant with API MPMS Chapter 13.1: maximum discrepancy {:.3}% (volume {:.3}%, mass {:.3}%) exceeds {:.2}% tolerance",
            max_volume.max(max_mass),
            max_volume,
            max_mass,
            thresholds.acceptable_pct
        )
    };

    MassBalanceStatistics {
        total_tanks: tanks.len(),
        acceptable_count: count(DiscrepancyStatus::Acceptable),
        warning_count: count(DiscrepancyStatus::Warning),
        critical_count: count(DiscrepancyStatus::Critical),
        average_volume_discrepancy_pct: mean(&volume_pcts),
        average_mass_discrepancy_pct: mean(&mass_pcts),
        max_volume_discrepancy_pct: max_volume,
        max_mass_discrepancy_pct: max_mass,
        total_transactions: global.transaction_count(),
        total_receipts: global.receipt_count,
        total_deliveries: global.delivery_count,
        net_volume_change_l: global.total_closing_volume_l - global.total_opening_volume_l,
        net_mass_change_kg: global.total_closing_mass_kg - global.total_opening_mass_kg,
        compliant_with_api_mpms: compliant,
        compliance_note,
    }
}

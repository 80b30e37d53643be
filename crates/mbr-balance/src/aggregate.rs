use crate::config::Thresholds;
use crate::status::{classify_status, discrepancy_pct};
use crate::types::{DiscrepancyStatus, GlobalBalance, TankBalance};

impl GlobalBalance {
    /// Zeroed fleet balance (the result for an empty fleet).
    pub fn empty() -> Self {
        Self {
            tank_count: 0,
            total_opening_volume_l: 0.0,
            total_opening_mass_kg: 0.0,
            total_closing_volume_l: 0.0,
            total_closing_mass_kg: 0.0,
            total_receipts_volume_l: 0.0,
            total_receipts_mass_kg: 0.0,
            total_deliveries_volume_l: 0.0,
            total_deliveries_mass_kg: 0.0,
            receipt_count: 0,
            delivery_count: 0,
            expected_closing_volume_l: 0.0,
            expected_closing_mass_kg: 0.0,
            volume_discrepancy_l: 0.0,
            mass_discrepancy_kg: 0.0,
            volume_discrepancy_pct: 0.0,
            mass_discrepancy_pct: 0.0,
            status: DiscrepancyStatus::Acceptable,
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.receipt_count + self.delivery_count
    }
}

/// Sum every tank into a fleet balance.
///
/// Expected closing, discrepancy and percent are recomputed from the summed
/// quantities with the per-tank formulas, so opposite-signed tank errors
/// cancel at fleet level. Status uses the same threshold rule.
pub fn aggregate(thresholds: &Thresholds, tanks: &[TankBalance]) -> GlobalBalance {
    let mut g = GlobalBalance::empty();

    for t in tanks {
        g.tank_count += 1;
        g.total_opening_volume_l += t.opening.volume_l;
        g.total_opening_mass_kg += t.opening.mass_kg;
        g.total_closing_volume_l += t.closing.volume_l;
        g.total_closing_mass_kg += t.closing.mass_kg;
        g.total_receipts_volume_l += t.total_receipts_volume_l;
        g.total_receipts_mass_kg += t.total_receipts_mass_kg;
        g.total_deliveries_volume_l += t.total_deliveries_volume_l;
        g.total_deliveries_mass_kg += t.total_deliveries_mass_kg;
        g.receipt_count += t.receipt_count;
        g.delivery_count += t.delivery_count;
    }

    g.expected_closing_volume_l =
        g.total_opening_volume_l + g.total_receipts_volume_l - g.total_deliveries_volume_l;
    g.expected_closing_mass_kg =
        g.total_opening_mass_kg + g.total_receipts_mass_kg - g.total_deliveries_mass_kg;

    g.volume_discrepancy_l = g.total_closing_volume_l - g.expected_closing_volume_l;
    g.mass_discrepancy_kg = g.total_closing_mass_kg - g.expected_closing_mass_kg;

    g.volume_discrepancy_pct = discrepancy_pct(g.volume_discrepancy_l, g.expected_closing_volume_l);
    g.mass_discrepancy_pct = discrepancy_pct(g.mass_discrepancy_kg, g.expected_closing_mass_kg);

    g.status = classify_status(thresholds, g.volume_discrepancy_pct, g.mass_discrepancy_pct);
    g
}

use chrono::{DateTime, Utc};

use crate::config::{AnalysisPolicy, BalanceConfig, Thresholds};
use crate::inference::TransactionSource;
use crate::snapshot::resolve_snapshot;
use crate::status::{classify_status, discrepancy_pct};
use crate::types::{
    DiscrepancyStatus, StockSnapshot, TankBalance, TankPeriodInput, Transaction, TransactionKind,
};

/// Inputs of a single tank balance computation.
#[derive(Clone, Debug, PartialEq)]
pub struct TankBalanceInput {
    pub tank_id: String,
    pub tank_name: String,
    pub product_type: String,
    pub opening_volume_l: f64,
    pub opening_mass_kg: f64,
    pub opening_ts: DateTime<Utc>,
    pub receipts: Vec<Transaction>,
    pub deliveries: Vec<Transaction>,
    pub closing_volume_l: f64,
    pub closing_mass_kg: f64,
    pub closing_ts: DateTime<Utc>,
}

// Folds from +0.0; `Sum for f64` yields -0.0 on empty input.
fn sum_volume(txs: &[Transaction]) -> f64 {
    txs.iter().fold(0.0, |acc, t| acc + t.volume_l)
}

fn sum_mass(txs: &[Transaction]) -> f64 {
    txs.iter().fold(0.0, |acc, t| acc + t.mass_kg)
}

/// Compute one tank's balance.
///
/// Steps:
/// 1. Σ receipts / deliveries (empty lists sum to zero)
/// 2. expected closing = opening + receipts - deliveries
/// 3. discrepancy = actual closing - expected (signed)
/// 4. percent = |discrepancy| / expected * 100, zero when expected <= 0
/// 5. status by the shared threshold rule
/// 6. reason text
///
/// Pure: identical input gives identical output, receipts and deliveries keep
/// input order.
pub fn calculate_tank_balance(
    thresholds: &Thresholds,
    analysis: &AnalysisPolicy,
    input: TankBalanceInput,
) -> TankBalance {
    let TankBalanceInput {
        tank_id,
        tank_name,
        product_type,
        opening_volume_l,
        opening_mass_kg,
        opening_ts,
        receipts,
        deliveries,
        closing_volume_l,
        closing_mass_kg,
        closing_ts,
    } = input;

    let total_receipts_volume_l = sum_volume(&receipts);
    let total_receipts_mass_kg = sum_mass(&receipts);
    let total_deliveries_volume_l = sum_volume(&deliveries);
    let total_deliveries_mass_kg = sum_mass(&deliveries);

    let expected_closing_volume_l =
        opening_volume_l + total_receipts_volume_l - total_deliveries_volume_l;
    let expected_closing_mass_kg =
        opening_mass_kg + total_receipts_mass_kg - total_deliveries_mass_kg;

    let volume_discrepancy_l = closing_volume_l - expected_closing_volume_l;
    let mass_discrepancy_kg = closing_mass_kg - expected_closing_mass_kg;

    let volume_discrepancy_pct = discrepancy_pct(volume_discrepancy_l, expected_closing_volume_l);
    let mass_discrepancy_pct = discrepancy_pct(mass_discrepancy_kg, expected_closing_mass_kg);

    let status = classify_status(thresholds, volume_discrepancy_pct, mass_discrepancy_pct);
    let transaction_count = receipts.len() + deliveries.len();

    let discrepancy_reason = build_reason(
        status,
        analysis,
        volume_discrepancy_l,
        mass_discrepancy_kg,
        volume_discrepancy_pct,
        mass_discrepancy_pct,
        transaction_count,
    );

    TankBalance {
        tank_id,
        tank_name,
        product_type,
        opening: StockSnapshot::new(opening_ts, opening_volume_l, opening_mass_kg),
        closing: StockSnapshot::new(closing_ts, closing_volume_l, closing_mass_kg),
        receipt_count: receipts.len(),
        delivery_count: deliveries.len(),
        receipts,
        deliveries,
        total_receipts_volume_l,
        total_receipts_mass_kg,
        total_deliveries_volume_l,
        total_deliveries_mass_kg,
        expected_closing_volume_l,
        expected_closing_mass_kg,
        volume_discrepancy_l,
        mass_discrepancy_kg,
        volume_discrepancy_pct,
        mass_discrepancy_pct,
        status,
        discrepancy_reason,
        thresholds: *thresholds,
    }
}

/// Observation order is fixed: gain/loss, cumulative error, temperature effect.
fn build_reason(
    status: DiscrepancyStatus,
    analysis: &AnalysisPolicy,
    volume_discrepancy_l: f64,
    mass_discrepancy_kg: f64,
    volume_pct: f64,
    mass_pct: f64,
    transaction_count: usize,
) -> String {
    if status == DiscrepancyStatus::Acceptable {
        return "within acceptable limits".to_string();
    }

    let mut observations: Vec<String> = Vec::new();

    let direction = if volume_discrepancy_l != 0.0 {
        volume_discrepancy_l
    } else {
        mass_discrepancy_kg
    };
    if direction > 0.0 {
        observations.push(format!(
            "Unexplained gain: closing stock exceeds expected by {:.2} L / {:.2} kg",
            volume_discrepancy_l, mass_discrepancy_kg
        ));
    } else {
        observations.push(format!(
            "Unexplained loss: closing stock short of expected by {:.2} L / {:.2} kg",
            volume_discrepancy_l.abs(),
            mass_discrepancy_kg.abs()
        ));
    }

    if transaction_count > analysis.reason_transaction_count {
        observations.push(format!(
            "{} transactions in period; cumulative measurement error likely",
            transaction_count
        ));
    }

    if (volume_pct - mass_pct).abs() > analysis.temperature_gap_pct {
        observations.push(format!(
            "Volume ({:.3}%) and mass ({:.3}%) discrepancies diverge; possible temperature effect",
            volume_pct, mass_pct
        ));
    }

    observations.join("; ")
}

/// Resolve boundary snapshots from the tank's series, pull receipts and
/// deliveries from `source`, and compute the balance.
///
/// The snapshot `source` (exact / prior sample / unavailable) is carried onto
/// the returned balance.
pub fn compute_tank_period(
    config: &BalanceConfig,
    source: &dyn TransactionSource,
    input: &TankPeriodInput,
) -> TankBalance {
    let opening = resolve_snapshot(&input.series, input.window.start);
    let closing = resolve_snapshot(&input.series, input.window.end);

    let receipts = source.transactions(&input.series, &input.window, TransactionKind::Receipt);
    let deliveries = source.transactions(&input.series, &input.window, TransactionKind::Delivery);

    let mut balance = calculate_tank_balance(
        &config.thresholds,
        &config.analysis,
        TankBalanceInput {
            tank_id: input.tank.tank_id.clone(),
            tank_name: input.tank.tank_name.clone(),
            product_type: input.tank.product_type.clone(),
            opening_volume_l: opening.volume_l,
            opening_mass_kg: opening.mass_kg,
            opening_ts: opening.timestamp,
            receipts,
            deliveries,
            closing_volume_l: closing.volume_l,
            closing_mass_kg: closing.mass_kg,
            closing_ts: closing.timestamp,
        },
    );

    balance.opening.source = opening.source;
    balance.closing.source = closing.source;
    balance
}

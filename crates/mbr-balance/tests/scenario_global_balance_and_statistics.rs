//! Fleet aggregation and run statistics.

use chrono::{DateTime, TimeZone, Utc};
use mbr_balance::*;

fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, day, 6, 0, 0).unwrap()
}

fn balance(
    id: &str,
    opening: (f64, f64),
    receipts: Vec<Transaction>,
    deliveries: Vec<Transaction>,
    closing: (f64, f64),
) -> TankBalance {
    calculate_tank_balance(
        &Thresholds::default(),
        &AnalysisPolicy::default(),
        TankBalanceInput {
            tank_id: id.to_string(),
            tank_name: format!("Tank {id}"),
            product_type: "jet_a1".to_string(),
            opening_volume_l: opening.0,
            opening_mass_kg: opening.1,
            opening_ts: ts(1),
            receipts,
            deliveries,
            closing_volume_l: closing.0,
            closing_mass_kg: closing.1,
            closing_ts: ts(31),
        },
    )
}

fn receipt(day: u32, v: f64, m: f64) -> Transaction {
    Transaction::recorded(TransactionKind::Receipt, ts(day), v, m, format!("R-{day}"))
}

fn delivery(day: u32, v: f64, m: f64) -> Transaction {
    Transaction::recorded(TransactionKind::Delivery, ts(day), v, m, format!("D-{day}"))
}

#[test]
fn empty_fleet_is_zeroed_acceptable_and_compliant() {
    let t = Thresholds::default();
    let g = aggregate(&t, &[]);
    assert_eq!(g, GlobalBalance::empty());
    assert_eq!(g.status, DiscrepancyStatus::Acceptable);

    let s = summarize(&t, &[], &g);
    assert_eq!(s.total_tanks, 0);
    assert_eq!(s.acceptable_count + s.warning_count + s.critical_count, 0);
    assert_eq!(s.average_volume_discrepancy_pct, 0.0);
    assert_eq!(s.max_mass_discrepancy_pct, 0.0);
    assert_eq!(s.total_transactions, 0);
    assert!(s.compliant_with_api_mpms);
    assert!(s.compliance_note.starts_with("Compliant"));

    let report = reconcile_fleet(&BalanceConfig::default(), vec![]);
    assert!(report.tanks.is_empty());
    assert!(report.discrepancies.is_empty());
}

#[test]
fn opposite_tank_errors_cancel_at_fleet_level() {
    let gain = balance("A", (10_000.0, 8_500.0), vec![], vec![], (10_100.0, 8_585.0));
    let loss = balance("B", (10_000.0, 8_500.0), vec![], vec![], (9_900.0, 8_415.0));
    assert_eq!(gain.status, DiscrepancyStatus::Critical);
    assert_eq!(loss.status, DiscrepancyStatus::Critical);

    let tanks = vec![gain, loss];
    let g = aggregate(&Thresholds::default(), &tanks);

    assert_eq!(g.tank_count, 2);
    assert!(g.volume_discrepancy_l.abs() < 1e-9);
    assert!(g.mass_discrepancy_kg.abs() < 1e-9);
    assert_eq!(g.status, DiscrepancyStatus::Acceptable);

    let s = summarize(&Thresholds::default(), &tanks, &g);
    assert_eq!(s.critical_count, 2);
    assert!((s.average_volume_discrepancy_pct - 1.0).abs() < 1e-9);
    assert!((s.max_volume_discrepancy_pct - 1.0).abs() < 1e-9);
    assert!(!s.compliant_with_api_mpms, "fleet cancellation does not hide tank errors");
    assert!(s.compliance_note.starts_with("Not compliant"));
}

#[test]
fn fleet_totals_sum_tanks_and_recompute_percentages() {
    let a = balance(
        "A",
        (5_000.0, 4_250.0),
        vec![receipt(3, 1_000.0, 850.0), receipt(9, 500.0, 425.0)],
        vec![delivery(12, 2_000.0, 1_700.0)],
        (4_480.0, 3_808.0),
    );
    let b = balance(
        "B",
        (20_000.0, 17_000.0),
        vec![],
        vec![delivery(4, 3_000.0, 2_550.0)],
        (17_000.0, 14_450.0),
    );
    let tanks = vec![a.clone(), b.clone()];
    let g = aggregate(&Thresholds::default(), &tanks);

    assert_eq!(g.receipt_count, 2);
    assert_eq!(g.delivery_count, 2);
    assert!((g.total_opening_volume_l - 25_000.0).abs() < 1e-9);
    assert!((g.total_receipts_volume_l - 1_500.0).abs() < 1e-9);
    assert!((g.total_deliveries_mass_kg - 4_250.0).abs() < 1e-9);
    assert!((g.expected_closing_volume_l - 21_500.0).abs() < 1e-9);
    assert!((g.volume_discrepancy_l + 20.0).abs() < 1e-9);
    assert!(
        (g.volume_discrepancy_pct - 20.0 / 21_500.0 * 100.0).abs() < 1e-9,
        "fleet pct is recomputed, not averaged"
    );
    assert!(g.volume_discrepancy_pct < a.volume_discrepancy_pct);
    assert_eq!(g.status, DiscrepancyStatus::Acceptable);

    let s = summarize(&Thresholds::default(), &tanks, &g);
    assert_eq!(s.total_transactions, 4);
    assert_eq!(s.total_receipts, 2);
    assert_eq!(s.total_deliveries, 2);
    assert!((s.net_volume_change_l - (21_480.0 - 25_000.0)).abs() < 1e-9);
    assert!((s.net_mass_change_kg - (18_258.0 - 21_250.0)).abs() < 1e-9);
    assert_eq!(s.warning_count, 1, "tank A is 0.44% short");
    assert_eq!(s.acceptable_count, 1);
    assert!(
        (s.max_volume_discrepancy_pct - a.volume_discrepancy_pct.max(b.volume_discrepancy_pct))
            .abs()
            < 1e-12
    );
}

#[test]
fn report_orders_tanks_by_id_regardless_of_input_order() {
    let mk = |id: &str| balance(id, (1_000.0, 850.0), vec![], vec![], (995.0, 845.75));
    let forward = reconcile_fleet(&BalanceConfig::default(), vec![mk("T1"), mk("T2"), mk("T3")]);
    let shuffled = reconcile_fleet(&BalanceConfig::default(), vec![mk("T3"), mk("T1"), mk("T2")]);

    let ids: Vec<&str> = shuffled.tanks.iter().map(|t| t.tank_id.as_str()).collect();
    assert_eq!(ids, vec!["T1", "T2", "T3"]);
    assert_eq!(forward, shuffled);
    assert_eq!(
        serde_json::to_string(&forward).unwrap(),
        serde_json::to_string(&shuffled).unwrap()
    );
    let found: Vec<&str> = shuffled
        .discrepancies
        .iter()
        .map(|d| d.tank_id.as_str())
        .collect();
    assert_eq!(found, vec!["T1", "T2", "T3"]);
}

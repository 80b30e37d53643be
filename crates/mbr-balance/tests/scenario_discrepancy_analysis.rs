//! Discrepancy analyzer: containment, kind classification, cause order,
//! recommendation text, investigation flag.

use chrono::{DateTime, TimeZone, Utc};
use mbr_balance::*;

fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, day, 12, 0, 0).unwrap()
}

/// Expected closing always equals `opening`, whatever `tx_count` is.
fn tank(id: &str, opening: (f64, f64), closing: (f64, f64), tx_count: u32) -> TankBalance {
    let mut receipts = Vec::new();
    let mut deliveries = Vec::new();
    for i in 0..tx_count {
        let day = 2 + (i % 25);
        if i % 2 == 0 {
            receipts.push(Transaction::recorded(
                TransactionKind::Receipt,
                ts(day),
                100.0,
                85.0,
                format!("R{i}"),
            ));
        } else {
            deliveries.push(Transaction::recorded(
                TransactionKind::Delivery,
                ts(day),
                100.0,
                85.0,
                format!("D{i}"),
            ));
        }
    }
    // Odd counts leave one unmatched receipt; compensate the opening.
    let extra = receipts.len() as f64 - deliveries.len() as f64;

    calculate_tank_balance(
        &Thresholds::default(),
        &AnalysisPolicy::default(),
        TankBalanceInput {
            tank_id: id.to_string(),
            tank_name: format!("Tank {id}"),
            product_type: "gasoline".to_string(),
            opening_volume_l: opening.0 - extra * 100.0,
            opening_mass_kg: opening.1 - extra * 85.0,
            opening_ts: ts(1),
            receipts,
            deliveries,
            closing_volume_l: closing.0,
            closing_mass_kg: closing.1,
            closing_ts: ts(28),
        },
    )
}

fn detect(tanks: &[TankBalance]) -> Vec<Discrepancy> {
    detect_discrepancies(&Thresholds::default(), &AnalysisPolicy::default(), tanks)
}

#[test]
fn tanks_within_tolerance_are_never_reported() {
    let tanks = vec![
        tank("A", (10_000.0, 8_500.0), (10_000.0, 8_500.0), 0),
        tank("B", (10_000.0, 8_500.0), (9_970.0, 8_474.5), 0), // exactly 0.3%
        tank("C", (10_000.0, 8_500.0), (9_960.0, 8_466.0), 0), // 0.4%
    ];
    let found = detect(&tanks);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].tank_id, "C");
    for d in &found {
        let t = tanks.iter().find(|t| t.tank_id == d.tank_id).unwrap();
        assert!(t.max_discrepancy_pct() > 0.3);
    }
}

#[test]
fn kind_reflects_which_dimension_exceeds() {
    let tanks = vec![
        tank("VOL", (10_000.0, 8_500.0), (9_950.0, 8_500.0), 0),
        tank("MASS", (10_000.0, 8_500.0), (10_000.0, 8_450.0), 0),
        tank("BOTH", (10_000.0, 8_500.0), (9_950.0, 8_450.0), 0),
    ];
    let found = detect(&tanks);
    let kind_of = |id: &str| found.iter().find(|d| d.tank_id == id).unwrap().kind;

    assert_eq!(kind_of("VOL"), DiscrepancyKind::Volume);
    assert_eq!(kind_of("MASS"), DiscrepancyKind::Mass);
    assert_eq!(kind_of("BOTH"), DiscrepancyKind::Both);
}

#[test]
fn loss_on_both_dimensions_lists_causes_in_fixed_order() {
    // -2% volume (-200 L), -0.4% mass, 6 transactions.
    let t = tank("LOSS", (10_000.0, 8_500.0), (9_800.0, 8_466.0), 6);
    let found = detect(std::slice::from_ref(&t));
    assert_eq!(found.len(), 1);
    let d = &found[0];

    assert_eq!(
        d.causes,
        vec![
            CauseCategory::CumulativeError,
            CauseCategory::TemperatureEffect,
            CauseCategory::EvaporationLoss,
            CauseCategory::GaugeCalibration,
            CauseCategory::StrappingTable,
        ]
    );
    assert_eq!(d.possible_causes.len(), d.causes.len());
    assert_eq!(
        d.possible_causes.last().map(String::as_str),
        Some("Tank strapping table accuracy")
    );
    assert_eq!(d.severity, DiscrepancyStatus::Critical);
    assert!(d.requires_investigation);
    assert!(d.volume_discrepancy_l < 0.0, "raw discrepancy keeps its sign");
}

#[test]
fn large_volume_gap_and_density_variation_are_detected() {
    // +1500 L on 100 000 L (1.5%), mass +3% => mass% > 1.5 * vol%.
    let t = tank("BIG", (100_000.0, 85_000.0), (101_500.0, 87_550.0), 0);
    let d = &detect(&[t])[0];

    assert!(d.causes.contains(&CauseCategory::UnrecordedTransaction));
    assert!(d.causes.contains(&CauseCategory::DensityVariation));
    assert!(!d.causes.contains(&CauseCategory::EvaporationLoss), "gain, not loss");
    assert!(!d.causes.contains(&CauseCategory::CumulativeError));
    assert_eq!(d.causes.last(), Some(&CauseCategory::StrappingTable));
}

#[test]
fn critical_recommendation_is_urgent_with_one_clause_per_action() {
    let t = tank("LOSS", (10_000.0, 8_500.0), (9_800.0, 8_466.0), 6);
    let d = &detect(&[t])[0];
    let r = &d.recommendation;

    assert!(r.starts_with("URGENT"), "recommendation: {r}");
    let calibrate = r.find("Calibrate").expect("calibration clause");
    let leaks = r.find("for leaks").expect("leak clause");
    let temp = r.find("temperature compensation").expect("temperature clause");
    let audit = r.find("Audit").expect("audit clause");
    assert!(calibrate < leaks && leaks < temp && temp < audit, "clause order: {r}");
    assert_eq!(r.matches("Audit").count(), 1);
}

#[test]
fn warning_recommendation_investigates_and_skips_absent_clauses() {
    // +0.4% on both dimensions, no transactions: only the strapping caveat applies.
    let t = tank("WARN", (10_000.0, 8_500.0), (10_040.0, 8_534.0), 0);
    let d = &detect(&[t])[0];

    assert_eq!(d.severity, DiscrepancyStatus::Warning);
    assert_eq!(d.causes, vec![CauseCategory::StrappingTable]);
    assert!(d.recommendation.starts_with("Investigate"));
    assert!(!d.recommendation.contains("Calibrate"));
    assert!(!d.recommendation.contains("leaks"));
    assert!(!d.requires_investigation, "0.4% does not exceed the warning threshold");
}

#[test]
fn severity_follows_the_detection_thresholds() {
    // +0.2% on both: acceptable under the default thresholds it was balanced with.
    let t = tank("TIGHT", (10_000.0, 8_500.0), (10_020.0, 8_517.0), 0);
    assert_eq!(t.status, DiscrepancyStatus::Acceptable);
    assert!(detect(std::slice::from_ref(&t)).is_empty());

    let tight = Thresholds {
        acceptable_pct: 0.1,
        warning_pct: 0.3,
        critical_pct: 0.6,
    };
    let found = detect_discrepancies(&tight, &AnalysisPolicy::default(), std::slice::from_ref(&t));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, DiscrepancyStatus::Warning);
    assert!(found[0].recommendation.starts_with("Investigate the discrepancy on Tank TIGHT"));
    assert!(!found[0].requires_investigation);

    let tighter = Thresholds {
        acceptable_pct: 0.05,
        warning_pct: 0.1,
        critical_pct: 0.15,
    };
    let found = detect_discrepancies(&tighter, &AnalysisPolicy::default(), &[t]);
    assert_eq!(found[0].severity, DiscrepancyStatus::Critical);
    assert!(found[0].recommendation.starts_with("URGENT"));
    assert!(found[0].requires_investigation);
}

#[test]
fn analyzer_is_total_on_empty_input() {
    assert!(detect(&[]).is_empty());
}

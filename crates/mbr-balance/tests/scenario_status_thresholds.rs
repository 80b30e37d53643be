//! Shared threshold rule: boundaries, monotonicity, configurable thresholds.

use mbr_balance::{classify_status, discrepancy_pct, DiscrepancyStatus, Thresholds};

#[test]
fn status_is_monotonic_in_max_percent() {
    let t = Thresholds::default();
    let mut prev = DiscrepancyStatus::Acceptable;

    // Sweep 0.000% .. 2.000% in 0.001 steps, alternating which dimension dominates.
    for i in 0..=2000u32 {
        let worst = i as f64 / 1000.0;
        let (v, m) = if i % 2 == 0 {
            (worst, worst / 3.0)
        } else {
            (worst / 7.0, worst)
        };
        let s = classify_status(&t, v, m);
        assert!(
            s >= prev,
            "status regressed at max={worst}: {prev:?} -> {s:?}"
        );
        prev = s;
    }
    assert_eq!(prev, DiscrepancyStatus::Critical);
}

#[test]
fn boundaries_are_inclusive_on_lower_bucket() {
    let t = Thresholds::default();
    assert_eq!(classify_status(&t, 0.0, 0.0), DiscrepancyStatus::Acceptable);
    assert_eq!(classify_status(&t, 0.3, 0.3), DiscrepancyStatus::Acceptable);
    assert_eq!(classify_status(&t, 0.30001, 0.0), DiscrepancyStatus::Warning);
    assert_eq!(classify_status(&t, 0.5, 0.0), DiscrepancyStatus::Warning);
    assert_eq!(classify_status(&t, 0.0, 0.50001), DiscrepancyStatus::Critical);
    assert_eq!(classify_status(&t, 1.0, 0.0), DiscrepancyStatus::Critical);
    assert_eq!(classify_status(&t, 25.0, 0.0), DiscrepancyStatus::Critical);
}

#[test]
fn status_uses_the_worse_dimension() {
    let t = Thresholds::default();
    assert_eq!(classify_status(&t, 0.1, 0.45), DiscrepancyStatus::Warning);
    assert_eq!(classify_status(&t, 0.7, 0.1), DiscrepancyStatus::Critical);
}

#[test]
fn overridden_thresholds_change_classification() {
    let strict = Thresholds {
        acceptable_pct: 0.1,
        warning_pct: 0.2,
        critical_pct: 0.4,
    };
    assert_eq!(classify_status(&strict, 0.25, 0.0), DiscrepancyStatus::Critical);
    assert_eq!(
        classify_status(&Thresholds::default(), 0.25, 0.0),
        DiscrepancyStatus::Acceptable
    );
}

#[test]
fn percent_is_never_negative_and_total_on_degenerate_input() {
    assert!(discrepancy_pct(-3.0, 300.0) > 0.0);
    assert_eq!(discrepancy_pct(-3.0, 0.0), 0.0);
    assert_eq!(discrepancy_pct(3.0, -1.0), 0.0);
    assert_eq!(discrepancy_pct(f64::NAN, 100.0), 0.0);
    assert_eq!(discrepancy_pct(1.0, f64::NAN), 0.0);
}

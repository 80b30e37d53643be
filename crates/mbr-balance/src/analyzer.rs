use crate::config::{AnalysisPolicy, Thresholds};
use crate::status::classify_status;
use crate::types::{CauseCategory, Discrepancy, DiscrepancyKind, DiscrepancyStatus, TankBalance};

/// Follow-up actions, in the order they appear in a recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Action {
    CalibrateGauge,
    InspectForLeaks,
    ReviewTemperatureCompensation,
    AuditTransactionRecords,
}

impl Action {
    fn for_cause(cause: CauseCategory) -> Option<Action> {
        match cause {
            CauseCategory::GaugeCalibration => Some(Action::CalibrateGauge),
            CauseCategory::EvaporationLoss => Some(Action::InspectForLeaks),
            CauseCategory::TemperatureEffect | CauseCategory::DensityVariation => {
                Some(Action::ReviewTemperatureCompensation)
            }
            CauseCategory::CumulativeError | CauseCategory::UnrecordedTransaction => {
                Some(Action::AuditTransactionRecords)
            }
            CauseCategory::StrappingTable => None,
        }
    }

    fn clause(&self) -> &'static str {
        match self {
            Action::CalibrateGauge => "Calibrate the tank level gauge.",
            Action::InspectForLeaks => "Inspect the tank, valves and connected lines for leaks.",
            Action::ReviewTemperatureCompensation => {
                "Review temperature compensation and density correction settings."
            }
            Action::AuditTransactionRecords => {
                "Audit receipt and delivery records for the period."
            }
        }
    }
}

/// One finding per tank whose `max(volume %, mass %)` exceeds the acceptable
/// threshold. Tanks within tolerance produce nothing. Output keeps input order.
pub fn detect_discrepancies(
    thresholds: &Thresholds,
    analysis: &AnalysisPolicy,
    tanks: &[TankBalance],
) -> Vec<Discrepancy> {
    tanks
        .iter()
        .filter(|t| t.max_discrepancy_pct() > thresholds.acceptable_pct)
        .map(|t| analyze_tank(thresholds, analysis, t))
        .collect()
}

fn analyze_tank(
    thresholds: &Thresholds,
    analysis: &AnalysisPolicy,
    tank: &TankBalance,
) -> Discrepancy {
    let v_pct = tank.volume_discrepancy_pct;
    let m_pct = tank.mass_discrepancy_pct;

    let kind = match (
        v_pct > thresholds.acceptable_pct,
        m_pct > thresholds.acceptable_pct,
    ) {
        (true, true) => DiscrepancyKind::Both,
        (true, false) => DiscrepancyKind::Volume,
        _ => DiscrepancyKind::Mass,
    };

    // From `thresholds`, not `tank.status`.
    let severity = classify_status(thresholds, v_pct, m_pct);
    let causes = possible_causes(thresholds, analysis, tank);
    let recommendation = recommend(severity, tank, &causes);

    Discrepancy {
        tank_id: tank.tank_id.clone(),
        tank_name: tank.tank_name.clone(),
        severity,
        kind,
        volume_discrepancy_l: tank.volume_discrepancy_l,
        volume_discrepancy_pct: v_pct,
        mass_discrepancy_kg: tank.mass_discrepancy_kg,
        mass_discrepancy_pct: m_pct,
        possible_causes: causes.iter().map(|c| c.description().to_string()).collect(),
        causes,
        recommendation,
        requires_investigation: v_pct > thresholds.warning_pct || m_pct > thresholds.warning_pct,
    }
}

/// Evaluation order is fixed; the strapping table caveat is always last.
fn possible_causes(
    thresholds: &Thresholds,
    analysis: &AnalysisPolicy,
    tank: &TankBalance,
) -> Vec<CauseCategory> {
    let v_pct = tank.volume_discrepancy_pct;
    let m_pct = tank.mass_discrepancy_pct;
    let mut causes = Vec::new();

    if tank.transaction_count() > analysis.cause_transaction_count {
        causes.push(CauseCategory::CumulativeError);
    }
    if (v_pct - m_pct).abs() > analysis.temperature_gap_pct {
        causes.push(CauseCategory::TemperatureEffect);
    }
    if tank.volume_discrepancy_l < 0.0 && tank.mass_discrepancy_kg < 0.0 {
        causes.push(CauseCategory::EvaporationLoss);
    }
    if v_pct > thresholds.warning_pct {
        causes.push(CauseCategory::GaugeCalibration);
    }
    if tank.volume_discrepancy_l.abs() > analysis.unrecorded_volume_l {
        causes.push(CauseCategory::UnrecordedTransaction);
    }
    if m_pct > analysis.density_ratio * v_pct {
        causes.push(CauseCategory::DensityVariation);
    }
    causes.push(CauseCategory::StrappingTable);

    causes
}

fn recommend(severity: DiscrepancyStatus, tank: &TankBalance, causes: &[CauseCategory]) -> String {
    let lead = match severity {
        DiscrepancyStatus::Critical => format!(
            "URGENT: suspend transfer operations on {} ({}) until the discrepancy is resolved.",
            tank.tank_name, tank.tank_id
        ),
        DiscrepancyStatus::Warning => format!(
            "Investigate the discrepancy on {} ({}) before the next custody transfer.",
            tank.tank_name, tank.tank_id
        ),
        DiscrepancyStatus::Acceptable => format!(
            "Monitor {} ({}) over the next reporting period.",
            tank.tank_name, tank.tank_id
        ),
    };

    let mut actions: Vec<Action> = causes.iter().filter_map(|c| Action::for_cause(*c)).collect();
    actions.sort();
    actions.dedup();

    let mut parts = vec![lead];
    parts.extend(actions.iter().map(|a| a.clause().to_string()));
    parts.join(" ")
}

use anyhow::{Context, Result};
use mbr_balance::{
    BalanceConfig, Discrepancy, DiscrepancyStatus, MassBalanceReport, MassBalanceStatistics,
    Period, Thresholds,
};
use mbr_config::ReportKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_COMPLIANCE_STANDARD: &str = "API MPMS Chapter 13.1";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Presentation settings read from the merged config.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Standard named in compliance reports (`/compliance/standard`).
    pub compliance_standard: String,
    /// Tolerances quoted in compliance reports, even for an empty fleet.
    pub thresholds: Thresholds,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            compliance_standard: DEFAULT_COMPLIANCE_STANDARD.to_string(),
            thresholds: Thresholds::default(),
        }
    }
}

impl ReportOptions {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let mut opts = ReportOptions {
            thresholds: BalanceConfig::from_config_json(config_json)?.thresholds,
            ..ReportOptions::default()
        };
        if let Some(v) = config_json.pointer("/compliance/standard") {
            let s: String = serde_json::from_value(v.clone())
                .context("invalid /compliance/standard (expected a string)")?;
            if !s.trim().is_empty() {
                opts.compliance_standard = s.trim().to_string();
            }
        }
        Ok(opts)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Full balance: every tank, the fleet aggregate, findings and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassBalanceDocument {
    pub period: Period,
    pub report: MassBalanceReport,
}

/// Findings only, for the operations desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub period: Period,
    pub tank_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub requires_investigation_count: usize,
    pub discrepancies: Vec<Discrepancy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankComplianceRow {
    pub tank_id: String,
    pub tank_name: String,
    pub status: DiscrepancyStatus,
    pub volume_discrepancy_pct: f64,
    pub mass_discrepancy_pct: f64,
    pub within_tolerance: bool,
}

/// Regulatory view: per-tank tolerance check plus the run verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub period: Period,
    pub standard: String,
    pub thresholds: Thresholds,
    pub compliant: bool,
    pub compliance_note: String,
    pub global_status: DiscrepancyStatus,
    pub tanks: Vec<TankComplianceRow>,
    pub statistics: MassBalanceStatistics,
}

/// One variant per [`ReportKind`]; serialised with a `report_kind` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report_kind", rename_all = "snake_case")]
pub enum ReportDocument {
    MassBalance(MassBalanceDocument),
    Discrepancy(DiscrepancyReport),
    Compliance(ComplianceReport),
}

impl ReportDocument {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportDocument::MassBalance(_) => ReportKind::MassBalance,
            ReportDocument::Discrepancy(_) => ReportKind::Discrepancy,
            ReportDocument::Compliance(_) => ReportKind::Compliance,
        }
    }

    /// `<kind>_report.json`
    pub fn file_name(&self) -> String {
        format!("{}_report.json", self.kind().as_str())
    }

    pub fn period(&self) -> &Period {
        match self {
            ReportDocument::MassBalance(d) => &d.period,
            ReportDocument::Discrepancy(d) => &d.period,
            ReportDocument::Compliance(d) => &d.period,
        }
    }
}

/// Shape `report` into the document for `kind`. Pure; never fails.
pub fn assemble(
    kind: ReportKind,
    report: &MassBalanceReport,
    period: Period,
    options: &ReportOptions,
) -> ReportDocument {
    match kind {
        ReportKind::MassBalance => ReportDocument::MassBalance(MassBalanceDocument {
            period,
            report: report.clone(),
        }),
        ReportKind::Discrepancy => ReportDocument::Discrepancy(discrepancy_report(report, period)),
        ReportKind::Compliance => {
            ReportDocument::Compliance(compliance_report(report, period, options))
        }
    }
}

fn discrepancy_report(report: &MassBalanceReport, period: Period) -> DiscrepancyReport {
    let count = |s: DiscrepancyStatus| {
        report
            .discrepancies
            .iter()
            .filter(|d| d.severity == s)
            .count()
    };

    DiscrepancyReport {
        period,
        tank_count: report.tanks.len(),
        warning_count: count(DiscrepancyStatus::Warning),
        critical_count: count(DiscrepancyStatus::Critical),
        requires_investigation_count: report
            .discrepancies
            .iter()
            .filter(|d| d.requires_investigation)
            .count(),
        discrepancies: report.discrepancies.clone(),
    }
}

fn compliance_report(
    report: &MassBalanceReport,
    period: Period,
    options: &ReportOptions,
) -> ComplianceReport {
    let tanks = report
        .tanks
        .iter()
        .map(|t| TankComplianceRow {
            tank_id: t.tank_id.clone(),
            tank_name: t.tank_name.clone(),
            status: t.status,
            volume_discrepancy_pct: t.volume_discrepancy_pct,
            mass_discrepancy_pct: t.mass_discrepancy_pct,
            within_tolerance: t.max_discrepancy_pct() <= t.thresholds.acceptable_pct,
        })
        .collect();

    ComplianceReport {
        period,
        standard: options.compliance_standard.clone(),
        thresholds: options.thresholds,
        compliant: report.statistics.compliant_with_api_mpms,
        compliance_note: report.statistics.compliance_note.clone(),
        global_status: report.global.status,
        tanks,
        statistics: report.statistics.clone(),
    }
}

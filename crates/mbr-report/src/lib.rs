//! mbr-report
//!
//! Output side of a reconciliation run: shapes a `MassBalanceReport` into the
//! document selected by `ReportKind` and writes it, with a run manifest, under
//! `<exports>/<run_id>/`.

pub mod artifacts;
pub mod document;

pub use artifacts::{
    write_report_json, write_run_artifacts, ArtifactList, RunArtifactsArgs, RunArtifactsResult,
    RunManifest, MANIFEST_SCHEMA_VERSION,
};
pub use document::{
    assemble, ComplianceReport, DiscrepancyReport, MassBalanceDocument, ReportDocument,
    ReportOptions, TankComplianceRow, DEFAULT_COMPLIANCE_STANDARD,
};

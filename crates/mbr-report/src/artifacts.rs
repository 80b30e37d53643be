use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mbr_balance::{DiscrepancyStatus, Period};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::document::ReportDocument;

pub const MANIFEST_SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub report_kind: String,
    pub config_hash: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub tank_count: usize,
    pub overall_status: DiscrepancyStatus,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub report_json: String,
}

pub struct RunArtifactsArgs<'a> {
    pub exports_root: &'a Path, // e.g. ./exports
    pub run_id: Uuid,
    pub config_hash: &'a str,
    pub tank_count: usize,
    pub overall_status: DiscrepancyStatus,
}

#[derive(Debug)]
pub struct RunArtifactsResult {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub report_path: PathBuf,
}

/// Write `<kind>_report.json` into `out_dir` (created if missing).
pub fn write_report_json(out_dir: &Path, doc: &ReportDocument) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(doc.file_name());
    let json = serde_json::to_string_pretty(doc).map_err(io::Error::other)?;
    fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}

/// `<exports_root>/<run_id>/` with the report document and `manifest.json`.
///
/// The report is written first; a manifest only exists for a run whose report
/// made it to disk.
pub fn write_run_artifacts(
    args: RunArtifactsArgs<'_>,
    doc: &ReportDocument,
) -> Result<RunArtifactsResult> {
    let run_dir = args.exports_root.join(args.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let report_path = write_report_json(&run_dir, doc)
        .with_context(|| format!("write report failed: {}", run_dir.display()))?;

    let period: &Period = doc.period();
    let manifest = RunManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        run_id: args.run_id,
        report_kind: doc.kind().as_str().to_string(),
        config_hash: args.config_hash.to_string(),
        period_start: period.start,
        period_end: period.end,
        tank_count: args.tank_count,
        overall_status: args.overall_status,
        created_at_utc: Utc::now(),
        artifacts: ArtifactList {
            manifest_json: "manifest.json".to_string(),
            report_json: doc.file_name(),
        },
    };

    let manifest_path = run_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(RunArtifactsResult {
        run_dir,
        manifest_path,
        report_path,
    })
}

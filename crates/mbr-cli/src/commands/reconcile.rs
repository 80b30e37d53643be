//! `mbr reconcile`: one full reconciliation run.
//!
//! Layered config -> catalog + telemetry -> per-tank balances (fan-out)
//! -> fleet report (fan-in) -> report document + manifest on disk.

use anyhow::{Context, Result};
use mbr_balance::{
    compute_tank_period, reconcile_fleet, BalanceConfig, DiscrepancyStatus, HeuristicInference,
    Period, TankBalance, TankPeriodInput,
};
use mbr_config::{load_layered_yaml, report_unused_keys, ReportKind, UnusedKeyPolicy};
use mbr_report::{assemble, write_run_artifacts, ReportOptions, RunArtifactsArgs};
use mbr_telemetry::{
    parse_samples_csv, parse_tanks_csv, AssetCatalog, InMemoryCatalog, TelemetrySource,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

#[derive(Debug)]
pub struct ReconcileArgs {
    pub config_paths: Vec<String>,
    pub tanks_csv: PathBuf,
    pub samples_csv: PathBuf,
    pub period: Period,
    pub kind: ReportKind,
    pub exports_root: PathBuf,
    pub strict_config: bool,
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub run_id: Uuid,
    pub kind: ReportKind,
    pub config_hash: String,
    pub tank_count: usize,
    pub status: DiscrepancyStatus,
    pub compliant: bool,
    pub discrepancy_count: usize,
    pub report_path: PathBuf,
    pub manifest_path: PathBuf,
}

pub async fn run_reconcile(args: ReconcileArgs) -> Result<ReconcileOutcome> {
    let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&path_refs)?;

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = report_unused_keys(args.kind, &loaded.config_json, policy)?;
    if !unused.is_clean() {
        tracing::warn!(
            report_kind = %unused.report_kind,
            unused = ?unused.unused_leaf_pointers,
            "config has keys no reader consumes"
        );
    }

    let config = BalanceConfig::from_config_json(&loaded.config_json)?;
    let options = ReportOptions::from_config_json(&loaded.config_json)?;

    let catalog = InMemoryCatalog::new(
        parse_tanks_csv(&args.tanks_csv)
            .with_context(|| format!("load tanks failed: {}", args.tanks_csv.display()))?,
    );
    let ingest = parse_samples_csv(&args.samples_csv)
        .with_context(|| format!("load samples failed: {}", args.samples_csv.display()))?;
    tracing::info!(
        tanks = catalog.len(),
        rows_read = ingest.rows_read,
        rows_rejected = ingest.rows_rejected,
        "inputs loaded"
    );

    let telemetry = ingest.into_telemetry();
    let uncatalogued: Vec<&str> = telemetry
        .tank_ids()
        .filter(|id| catalog.tank(id).is_err())
        .collect();
    if !uncatalogued.is_empty() {
        tracing::warn!(tanks = ?uncatalogued, "telemetry for tanks not in the catalog is ignored");
    }

    let telemetry: Arc<dyn TelemetrySource> = Arc::new(telemetry);
    let tanks = compute_balances(&catalog, telemetry, config, args.period).await?;

    let report = reconcile_fleet(&config, tanks);
    let doc = assemble(args.kind, &report, args.period, &options);

    let run_id = Uuid::new_v4();
    let written = write_run_artifacts(
        RunArtifactsArgs {
            exports_root: &args.exports_root,
            run_id,
            config_hash: &loaded.config_hash,
            tank_count: report.tanks.len(),
            overall_status: report.global.status,
        },
        &doc,
    )?;

    tracing::info!(
        %run_id,
        status = report.global.status.as_str(),
        discrepancies = report.discrepancies.len(),
        "reconciliation complete"
    );

    Ok(ReconcileOutcome {
        run_id,
        kind: args.kind,
        config_hash: loaded.config_hash,
        tank_count: report.tanks.len(),
        status: report.global.status,
        compliant: report.statistics.compliant_with_api_mpms,
        discrepancy_count: report.discrepancies.len(),
        report_path: written.report_path,
        manifest_path: written.manifest_path,
    })
}

/// One blocking task per catalog tank. Results are collected in completion
/// order; `reconcile_fleet` puts them back in tank-id order.
///
/// Any tank without telemetry fails the whole run.
async fn compute_balances(
    catalog: &dyn AssetCatalog,
    telemetry: Arc<dyn TelemetrySource>,
    config: BalanceConfig,
    window: Period,
) -> Result<Vec<TankBalance>> {
    let source = HeuristicInference::new(config.inference);
    let mut set = JoinSet::new();

    for tank in catalog.tanks() {
        let telemetry = Arc::clone(&telemetry);
        set.spawn_blocking(move || -> Result<TankBalance> {
            let series = telemetry
                .fetch_series(&tank.tank_id, &window)
                .with_context(|| format!("tank {}: telemetry fetch failed", tank.tank_id))?;
            tracing::debug!(
                tank_id = %tank.tank_id,
                samples = series.volume_l.len(),
                source = telemetry.name(),
                "tank series fetched"
            );
            let input = TankPeriodInput {
                tank,
                window,
                series,
            };
            Ok(compute_tank_period(&config, &source, &input))
        });
    }

    let mut balances = Vec::new();
    while let Some(joined) = set.join_next().await {
        let balance = joined.context("tank balance task panicked")??;
        balances.push(balance);
    }
    Ok(balances)
}

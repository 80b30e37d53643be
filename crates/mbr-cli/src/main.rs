use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mbr")]
#[command(about = "Mass balance reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Reconcile every catalog tank over a period and write the report
    Reconcile {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Tank catalog CSV (tank_id,tank_name[,product_type])
        #[arg(long)]
        tanks: String,

        /// Telemetry samples CSV (tank_id,timestamp,key,value)
        #[arg(long)]
        samples: String,

        /// Period start, RFC 3339 (inclusive)
        #[arg(long)]
        start: String,

        /// Period end, RFC 3339 (inclusive)
        #[arg(long)]
        end: String,

        /// Report kind: mass_balance | discrepancy | compliance
        #[arg(long, default_value = "mass_balance")]
        kind: String,

        /// Exports root (default: $MBR_EXPORTS_DIR, else ./exports)
        #[arg(long)]
        out: Option<String>,

        /// Fail when the config has keys no reader consumes for this report kind
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mbr_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Reconcile {
            config_paths,
            tanks,
            samples,
            start,
            end,
            kind,
            out,
            strict_config,
        } => {
            let args = commands::reconcile::ReconcileArgs {
                config_paths,
                tanks_csv: tanks.into(),
                samples_csv: samples.into(),
                period: commands::parse_period(&start, &end)?,
                kind: mbr_config::ReportKind::parse(&kind)?,
                exports_root: commands::exports_root(out.as_deref()),
                strict_config,
            };
            let outcome = commands::reconcile::run_reconcile(args).await?;

            println!("run_id={}", outcome.run_id);
            println!("report_kind={}", outcome.kind.as_str());
            println!("config_hash={}", outcome.config_hash);
            println!("tanks={}", outcome.tank_count);
            println!("status={}", outcome.status.as_str());
            println!("compliant={}", outcome.compliant);
            println!("discrepancies={}", outcome.discrepancy_count);
            println!("report={}", outcome.report_path.display());
            println!("manifest={}", outcome.manifest_path.display());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays `key=value` only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

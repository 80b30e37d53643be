//! Command handler modules for the `mbr` CLI.
//!
//! Shared argument parsing lives here; command logic lives in the submodules.

pub mod reconcile;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use mbr_balance::Period;
use std::path::PathBuf;

/// Env var overriding the default exports root.
pub const ENV_EXPORTS_DIR: &str = "MBR_EXPORTS_DIR";

/// Parse `--start` / `--end` (RFC 3339, any offset, normalised to UTC).
pub fn parse_period(start: &str, end: &str) -> Result<Period> {
    let start: DateTime<Utc> = DateTime::parse_from_rfc3339(start.trim())
        .with_context(|| format!("invalid --start '{start}' (expected RFC 3339)"))?
        .with_timezone(&Utc);
    let end: DateTime<Utc> = DateTime::parse_from_rfc3339(end.trim())
        .with_context(|| format!("invalid --end '{end}' (expected RFC 3339)"))?
        .with_timezone(&Utc);

    if start > end {
        bail!(
            "PERIOD_INVALID: start {} is after end {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        );
    }
    Ok(Period::new(start, end))
}

/// `--out`, else `$MBR_EXPORTS_DIR`, else `./exports`.
pub fn exports_root(out: Option<&str>) -> PathBuf {
    if let Some(p) = out {
        return PathBuf::from(p);
    }
    match std::env::var(ENV_EXPORTS_DIR) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => PathBuf::from("exports"),
    }
}

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Discrepancy tolerances in percent (API MPMS Chapter 13.1 defaults).
///
/// Classification of `max(volume %, mass %)`:
/// - `<= acceptable_pct` => acceptable
/// - `<= warning_pct`    => warning
/// - otherwise           => critical
///
/// `critical_pct` is carried on every balance for reporting; it does not add a
/// fourth bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub acceptable_pct: f64,
    pub warning_pct: f64,
    pub critical_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            acceptable_pct: 0.3,
            warning_pct: 0.5,
            critical_pct: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Inference policy
// ---------------------------------------------------------------------------

/// Constants for inferring transactions from adjacent volume samples.
///
/// These are a stand-in for a real batch-transfer ledger and are not assumed
/// correct for every product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferencePolicy {
    /// A volume step must be strictly larger than this to count as a transfer.
    pub significance_threshold_l: f64,
    /// Used to approximate mass when the mass series does not cover the step.
    pub assumed_density_kg_per_l: f64,
}

impl Default for InferencePolicy {
    fn default() -> Self {
        Self {
            significance_threshold_l: 100.0,
            assumed_density_kg_per_l: 0.85,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis policy
// ---------------------------------------------------------------------------

/// Heuristic cut-offs for reason text and root-cause candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPolicy {
    /// Balance reason mentions cumulative error above this transaction count.
    pub reason_transaction_count: usize,
    /// Analyzer lists cumulative error above this transaction count.
    pub cause_transaction_count: usize,
    /// |volume % - mass %| above this suggests a temperature effect.
    pub temperature_gap_pct: f64,
    /// |volume discrepancy| above this (liters) suggests an unrecorded transfer.
    pub unrecorded_volume_l: f64,
    /// mass % above `density_ratio * volume %` suggests density variation.
    pub density_ratio: f64,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            reason_transaction_count: 10,
            cause_transaction_count: 5,
            temperature_gap_pct: 0.2,
            unrecorded_volume_l: 1000.0,
            density_ratio: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub thresholds: Thresholds,
    pub inference: InferencePolicy,
    pub analysis: AnalysisPolicy,
}

impl BalanceConfig {
    /// Read `/thresholds`, `/inference` and `/analysis` from a merged config
    /// document. Missing sections or keys fall back to defaults; other
    /// top-level keys are ignored.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let mut cfg = BalanceConfig::default();

        if let Some(v) = config_json.pointer("/thresholds") {
            cfg.thresholds =
                serde_json::from_value(v.clone()).context("invalid /thresholds section")?;
        }
        if let Some(v) = config_json.pointer("/inference") {
            cfg.inference =
                serde_json::from_value(v.clone()).context("invalid /inference section")?;
        }
        if let Some(v) = config_json.pointer("/analysis") {
            cfg.analysis =
                serde_json::from_value(v.clone()).context("invalid /analysis section")?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        let finite = [t.acceptable_pct, t.warning_pct, t.critical_pct]
            .iter()
            .all(|x| x.is_finite());
        if !finite
            || t.acceptable_pct < 0.0
            || t.acceptable_pct > t.warning_pct
            || t.warning_pct > t.critical_pct
        {
            bail!(
                "CONFIG_INVALID_THRESHOLDS: require 0 <= acceptable <= warning <= critical \
                 (got acceptable={} warning={} critical={})",
                t.acceptable_pct,
                t.warning_pct,
                t.critical_pct
            );
        }

        let i = &self.inference;
        if !(i.significance_threshold_l.is_finite() && i.significance_threshold_l >= 0.0) {
            bail!(
                "CONFIG_INVALID_INFERENCE: significance_threshold_l must be >= 0 (got {})",
                i.significance_threshold_l
            );
        }
        if !(i.assumed_density_kg_per_l.is_finite() && i.assumed_density_kg_per_l > 0.0) {
            bail!(
                "CONFIG_INVALID_INFERENCE: assumed_density_kg_per_l must be > 0 (got {})",
                i.assumed_density_kg_per_l
            );
        }

        let a = &self.analysis;
        let finite = [a.temperature_gap_pct, a.unrecorded_volume_l, a.density_ratio]
            .iter()
            .all(|x| x.is_finite() && *x >= 0.0);
        if !finite {
            bail!("CONFIG_INVALID_ANALYSIS: analysis cut-offs must be finite and >= 0");
        }

        Ok(())
    }
}

//! Transaction sources.
//!
//! The balance calculator only ever sees `Vec<Transaction>`. Where those come
//! from is a strategy: today they are inferred from volume steps
//! ([`HeuristicInference`]); an authoritative batch-transfer ledger plugs in
//! through [`RecordedTransactions`] without touching the calculator.

use chrono::{DateTime, Utc};

use crate::config::InferencePolicy;
use crate::snapshot::latest_at_or_before;
use crate::types::{Period, Sample, TankSeries, Transaction, TransactionKind};

/// Supplies the receipts or deliveries of one tank for one window.
///
/// Implementations must be deterministic and preserve chronological order.
pub trait TransactionSource: Send + Sync {
    /// Human-readable name for logs and report metadata.
    fn name(&self) -> &'static str;

    fn transactions(
        &self,
        series: &TankSeries,
        window: &Period,
        kind: TransactionKind,
    ) -> Vec<Transaction>;
}

// ---------------------------------------------------------------------------
// Heuristic inference
// ---------------------------------------------------------------------------

/// Infers transfers from adjacent volume samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeuristicInference {
    pub policy: InferencePolicy,
}

impl HeuristicInference {
    pub fn new(policy: InferencePolicy) -> Self {
        Self { policy }
    }

    /// Walk adjacent pairs of `series.volume_l` and emit every step of the
    /// requested kind whose magnitude is strictly above the significance
    /// threshold. Fewer than two samples yield an empty list.
    pub fn infer(&self, series: &TankSeries, kind: TransactionKind) -> Vec<Transaction> {
        let mut out = Vec::new();

        for pair in series.volume_l.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let delta = curr.value - prev.value;
            if delta.is_nan() || delta.abs() <= self.policy.significance_threshold_l {
                continue;
            }

            let step_kind = if delta > 0.0 {
                TransactionKind::Receipt
            } else {
                TransactionKind::Delivery
            };
            if step_kind != kind {
                continue;
            }

            let volume_l = delta.abs();
            let mass_kg = match (
                value_at(&series.mass_kg, prev.timestamp),
                value_at(&series.mass_kg, curr.timestamp),
            ) {
                (Some(m0), Some(m1)) => (m1 - m0).abs(),
                _ => volume_l * self.policy.assumed_density_kg_per_l,
            };

            out.push(Transaction {
                kind,
                timestamp: curr.timestamp,
                volume_l,
                mass_kg,
                temperature_c: value_at(&series.temperature_c, curr.timestamp),
                density_kg_per_l: mass_kg / volume_l,
                batch_reference: batch_reference(kind, curr.timestamp),
                notes: format!(
                    "Inferred {} from volume change of {:.1} L between {} and {}",
                    kind.as_str(),
                    delta,
                    prev.timestamp.to_rfc3339(),
                    curr.timestamp.to_rfc3339()
                ),
            });
        }

        out
    }
}

impl TransactionSource for HeuristicInference {
    fn name(&self) -> &'static str {
        "heuristic_volume_steps"
    }

    fn transactions(
        &self,
        series: &TankSeries,
        window: &Period,
        kind: TransactionKind,
    ) -> Vec<Transaction> {
        let from_opening = TankSeries {
            volume_l: from_opening_sample(&series.volume_l, window),
            mass_kg: from_opening_sample(&series.mass_kg, window),
            temperature_c: from_opening_sample(&series.temperature_c, window),
        };
        self.infer(&from_opening, kind)
    }
}

/// Samples inside `window`, led by the pre-window sample the opening snapshot
/// resolves to when no sample sits exactly on `window.start`. A transfer that
/// straddles the start boundary is then counted in the period.
fn from_opening_sample(samples: &[Sample], window: &Period) -> Vec<Sample> {
    let seed = latest_at_or_before(samples, window.start).filter(|s| s.timestamp < window.start);
    seed.into_iter()
        .chain(samples.iter().filter(|s| window.contains(s.timestamp)))
        .copied()
        .collect()
}

fn value_at(samples: &[Sample], ts: DateTime<Utc>) -> Option<f64> {
    samples.iter().find(|s| s.timestamp == ts).map(|s| s.value)
}

fn batch_reference(kind: TransactionKind, ts: DateTime<Utc>) -> String {
    let prefix = match kind {
        TransactionKind::Receipt => "RCPT",
        TransactionKind::Delivery => "DLVR",
    };
    format!("AUTO-{}-{}", prefix, ts.format("%Y%m%d%H%M%S"))
}

// ---------------------------------------------------------------------------
// Recorded ledger
// ---------------------------------------------------------------------------

/// Passthrough over an authoritative transaction ledger for one tank.
/// The telemetry series is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedTransactions {
    pub ledger: Vec<Transaction>,
}

impl RecordedTransactions {
    pub fn new(ledger: Vec<Transaction>) -> Self {
        Self { ledger }
    }
}

impl TransactionSource for RecordedTransactions {
    fn name(&self) -> &'static str {
        "recorded_ledger"
    }

    fn transactions(
        &self,
        _series: &TankSeries,
        window: &Period,
        kind: TransactionKind,
    ) -> Vec<Transaction> {
        self.ledger
            .iter()
            .filter(|t| t.kind == kind && window.contains(t.timestamp))
            .cloned()
            .collect()
    }
}

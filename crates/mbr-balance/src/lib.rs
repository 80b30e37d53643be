//! mbr-balance
//!
//! Mass Balance Reconciliation Engine
//!
//! Architectural decisions:
//! - Expected closing stock is always derived (opening + receipts - deliveries), never supplied
//! - Discrepancy percent is |discrepancy| / expected; raw discrepancy stays signed
//! - One threshold rule classifies tanks and the fleet (acceptable / warning / critical)
//! - Fleet discrepancy is recomputed from summed quantities, not averaged percentages
//! - Transaction inference sits behind `TransactionSource` so a batch ledger can replace it
//!
//! Deterministic, pure logic. No IO, no wall-clock, no logging.
//! Every operation is total: empty or degenerate input yields zero-valued output.

mod aggregate;
mod analyzer;
mod calculator;
mod config;
mod fleet;
mod inference;
mod snapshot;
mod statistics;
mod status;
mod types;

pub use aggregate::aggregate;
pub use analyzer::detect_discrepancies;
pub use calculator::{calculate_tank_balance, compute_tank_period, TankBalanceInput};
pub use config::{AnalysisPolicy, BalanceConfig, InferencePolicy, Thresholds};
pub use fleet::reconcile_fleet;
pub use inference::{HeuristicInference, RecordedTransactions, TransactionSource};
pub use snapshot::resolve_snapshot;
pub use statistics::summarize;
pub use status::{classify_status, discrepancy_pct};
pub use types::*;

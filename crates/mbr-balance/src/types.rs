use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single telemetry sample (value keyed by timestamp).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Chronologically ordered series for one tank, one series per telemetry key.
///
/// `volume_l` is liters, `mass_kg` kilograms, `temperature_c` degrees Celsius.
/// Any series may be empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TankSeries {
    pub volume_l: Vec<Sample>,
    pub mass_kg: Vec<Sample>,
    #[serde(default)]
    pub temperature_c: Vec<Sample>,
}

impl TankSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts every series by timestamp (stable, so equal timestamps keep input order).
    pub fn sorted(mut self) -> Self {
        self.volume_l.sort_by_key(|s| s.timestamp);
        self.mass_kg.sort_by_key(|s| s.timestamp);
        self.temperature_c.sort_by_key(|s| s.timestamp);
        self
    }
}

/// Reporting window. Both bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Tank identity as supplied by the asset catalog.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankInfo {
    pub tank_id: String,
    pub tank_name: String,
    pub product_type: String,
}

impl TankInfo {
    pub fn new(
        tank_id: impl Into<String>,
        tank_name: impl Into<String>,
        product_type: impl Into<String>,
    ) -> Self {
        Self {
            tank_id: tank_id.into(),
            tank_name: tank_name.into(),
            product_type: product_type.into(),
        }
    }
}

/// Everything needed to compute one tank's balance over one period.
#[derive(Clone, Debug, PartialEq)]
pub struct TankPeriodInput {
    pub tank: TankInfo,
    pub window: Period,
    pub series: TankSeries,
}

// ---------------------------------------------------------------------------
// Snapshots + transactions
// ---------------------------------------------------------------------------

/// How a boundary snapshot was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Both volume and mass samples sit exactly on the boundary.
    Exact,
    /// At least one dimension fell back to the nearest earlier sample.
    PriorSample,
    /// No sample at or before the boundary; values are zero.
    Unavailable,
}

/// Tank inventory at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub timestamp: DateTime<Utc>,
    pub volume_l: f64,
    pub mass_kg: f64,
    pub source: SnapshotSource,
}

impl StockSnapshot {
    pub fn new(timestamp: DateTime<Utc>, volume_l: f64, mass_kg: f64) -> Self {
        Self {
            timestamp,
            volume_l,
            mass_kg,
            source: SnapshotSource::Exact,
        }
    }

    pub fn unavailable(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            volume_l: 0.0,
            mass_kg: 0.0,
            source: SnapshotSource::Unavailable,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Receipt,
    Delivery,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Receipt => "receipt",
            TransactionKind::Delivery => "delivery",
        }
    }
}

/// A single receipt or delivery. Volumes and masses are non-negative magnitudes;
/// the direction is carried by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub volume_l: f64,
    pub mass_kg: f64,
    pub temperature_c: Option<f64>,
    pub density_kg_per_l: f64,
    pub batch_reference: String,
    pub notes: String,
}

impl Transaction {
    /// Minimal constructor used for recorded (non-inferred) transactions.
    /// Density is derived from mass / volume (zero when volume is zero).
    pub fn recorded(
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
        volume_l: f64,
        mass_kg: f64,
        batch_reference: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            timestamp,
            volume_l,
            mass_kg,
            temperature_c: None,
            density_kg_per_l: if volume_l > 0.0 { mass_kg / volume_l } else { 0.0 },
            batch_reference: batch_reference.into(),
            notes: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// Discrepancy status, ordered by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyStatus {
    Acceptable,
    Warning,
    Critical,
}

impl DiscrepancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyStatus::Acceptable => "acceptable",
            DiscrepancyStatus::Warning => "warning",
            DiscrepancyStatus::Critical => "critical",
        }
    }
}

/// One tank's opening -> closing balance for a period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankBalance {
    pub tank_id: String,
    pub tank_name: String,
    pub product_type: String,

    pub opening: StockSnapshot,
    pub closing: StockSnapshot,

    pub receipts: Vec<Transaction>,
    pub deliveries: Vec<Transaction>,
    pub total_receipts_volume_l: f64,
    pub total_receipts_mass_kg: f64,
    pub total_deliveries_volume_l: f64,
    pub total_deliveries_mass_kg: f64,
    pub receipt_count: usize,
    pub delivery_count: usize,

    pub expected_closing_volume_l: f64,
    pub expected_closing_mass_kg: f64,

    /// Signed: actual closing - expected closing.
    pub volume_discrepancy_l: f64,
    pub mass_discrepancy_kg: f64,
    /// Non-negative magnitude relative to expected closing.
    pub volume_discrepancy_pct: f64,
    pub mass_discrepancy_pct: f64,

    pub status: DiscrepancyStatus,
    pub discrepancy_reason: String,
    pub thresholds: Thresholds,
}

impl TankBalance {
    pub fn transaction_count(&self) -> usize {
        self.receipt_count + self.delivery_count
    }

    pub fn max_discrepancy_pct(&self) -> f64 {
        self.volume_discrepancy_pct.max(self.mass_discrepancy_pct)
    }
}

/// Fleet-wide balance across every tank of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalBalance {
    pub tank_count: usize,

    pub total_opening_volume_l: f64,
    pub total_opening_mass_kg: f64,
    pub total_closing_volume_l: f64,
    pub total_closing_mass_kg: f64,

    pub total_receipts_volume_l: f64,
    pub total_receipts_mass_kg: f64,
    pub total_deliveries_volume_l: f64,
    pub total_deliveries_mass_kg: f64,
    pub receipt_count: usize,
    pub delivery_count: usize,

    pub expected_closing_volume_l: f64,
    pub expected_closing_mass_kg: f64,
    pub volume_discrepancy_l: f64,
    pub mass_discrepancy_kg: f64,
    pub volume_discrepancy_pct: f64,
    pub mass_discrepancy_pct: f64,

    pub status: DiscrepancyStatus,
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Which dimension(s) exceeded the acceptable threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    Volume,
    Mass,
    Both,
}

/// Root-cause candidates, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseCategory {
    CumulativeError,
    TemperatureEffect,
    EvaporationLoss,
    GaugeCalibration,
    UnrecordedTransaction,
    DensityVariation,
    StrappingTable,
}

impl CauseCategory {
    pub fn description(&self) -> &'static str {
        match self {
            CauseCategory::CumulativeError => {
                "Cumulative measurement error across multiple transactions"
            }
            CauseCategory::TemperatureEffect => {
                "Temperature effect: volume and mass discrepancies diverge"
            }
            CauseCategory::EvaporationLoss => "Evaporation or physical loss (leak) of product",
            CauseCategory::GaugeCalibration => "Level gauge calibration drift",
            CauseCategory::UnrecordedTransaction => "Unrecorded receipt or delivery",
            CauseCategory::DensityVariation => "Product density variation between batches",
            CauseCategory::StrappingTable => "Tank strapping table accuracy",
        }
    }
}

/// A per-tank finding, emitted only for tanks beyond the acceptable threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub tank_id: String,
    pub tank_name: String,
    pub severity: DiscrepancyStatus,
    pub kind: DiscrepancyKind,
    pub volume_discrepancy_l: f64,
    pub volume_discrepancy_pct: f64,
    pub mass_discrepancy_kg: f64,
    pub mass_discrepancy_pct: f64,
    pub causes: Vec<CauseCategory>,
    /// Same order as `causes`.
    pub possible_causes: Vec<String>,
    pub recommendation: String,
    pub requires_investigation: bool,
}

/// Read-only distribution view over every tank balance of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassBalanceStatistics {
    pub total_tanks: usize,
    pub acceptable_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,

    pub average_volume_discrepancy_pct: f64,
    pub average_mass_discrepancy_pct: f64,
    pub max_volume_discrepancy_pct: f64,
    pub max_mass_discrepancy_pct: f64,

    pub total_transactions: usize,
    pub total_receipts: usize,
    pub total_deliveries: usize,
    pub net_volume_change_l: f64,
    pub net_mass_change_kg: f64,

    pub compliant_with_api_mpms: bool,
    pub compliance_note: String,
}

/// Full output of one reconciliation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassBalanceReport {
    pub tanks: Vec<TankBalance>,
    pub global: GlobalBalance,
    pub discrepancies: Vec<Discrepancy>,
    pub statistics: MassBalanceStatistics,
}

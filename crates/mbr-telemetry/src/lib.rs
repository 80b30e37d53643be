//! mbr-telemetry
//!
//! Input-side boundary for reconciliation runs: where tank series and tank
//! identities come from.
//!
//! This crate owns the telemetry and asset-catalog traits, in-memory
//! implementations, and CSV ingestion into them. It does **not** compute
//! balances; callers hand the fetched series to `mbr-balance`.

pub mod catalog;
pub mod error;
pub mod ingest_csv;
pub mod source;

pub use catalog::{AssetCatalog, InMemoryCatalog};
pub use error::TelemetryError;
pub use ingest_csv::{
    parse_samples_csv, parse_samples_csv_str, parse_tanks_csv, parse_tanks_csv_str,
    SampleIngest, TelemetryKey,
};
pub use source::{InMemoryTelemetry, TelemetrySource};

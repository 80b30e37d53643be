use std::fmt;

/// Errors raised at the input boundary, before the engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// No series could be supplied for a tank over the requested window.
    DataUnavailable { tank_id: String, reason: String },
    /// The asset catalog has no tank with this id.
    UnknownTank(String),
    /// An I/O or CSV-library error.
    Io(String),
    /// The header row is missing a required column.
    MissingHeader(String),
    /// A record field could not be parsed into the expected type.
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::DataUnavailable { tank_id, reason } => {
                write!(f, "telemetry unavailable for tank '{tank_id}': {reason}")
            }
            TelemetryError::UnknownTank(id) => write!(f, "unknown tank: '{id}'"),
            TelemetryError::Io(msg) => write!(f, "telemetry io error: {msg}"),
            TelemetryError::MissingHeader(col) => {
                write!(f, "csv missing required header column: '{col}'")
            }
            TelemetryError::ParseField { row, field, raw } => {
                write!(
                    f,
                    "csv row {row}: cannot parse field '{field}' from value '{raw}'"
                )
            }
        }
    }
}

impl std::error::Error for TelemetryError {}

impl From<csv::Error> for TelemetryError {
    fn from(e: csv::Error) -> Self {
        TelemetryError::Io(e.to_string())
    }
}

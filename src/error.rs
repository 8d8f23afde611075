//! Error types for the demand-hybrid library.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while building panels, forecasting or backtesting.
///
/// Degenerate data inside a single series (all zeros, one observation) is never
/// reported through this type; it degrades to a defined fallback forecast instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// A required column is absent from the input table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A column exists but holds the wrong kind of values.
    #[error("column `{column}` must hold {expected} values")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Demand quantities must not be negative.
    #[error("negative demand {value} for {key} at {week_start}")]
    NegativeDemand {
        key: String,
        week_start: NaiveDate,
        value: f64,
    },

    /// More than one observation for the same series and week.
    #[error("duplicated observation for {key} at {week_start}")]
    DuplicateObservation { key: String, week_start: NaiveDate },

    /// The requested series is not part of the fitted panel.
    #[error("unknown series: {0}")]
    UnknownSeries(String),
}

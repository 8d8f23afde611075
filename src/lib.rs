//! # demand-hybrid
//!
//! Weekly demand forecasting for panels of (location, category) series.
//!
//! Each series is classified into a demand pattern (smooth, erratic,
//! intermittent, lumpy) from its average demand interval and squared
//! coefficient of variation, then forecast with a pattern-specific blend of
//! a seasonal lookback and a moving average. Croston-SBA and the plain
//! baselines are available as standalone benchmarks, and a rolling-origin
//! validator backtests everything on clean weekly history.
//!
//! # Example
//!
//! ```
//! use demand_hybrid::prelude::*;
//! use chrono::NaiveDate;
//!
//! let monday = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
//! let panel = HistoryPanel::builder()
//!     .weekly_series(SeriesKey::new("44", "PRODUCE"), monday, &[20.0, 22.0, 19.0, 21.0])
//!     .weekly_series(SeriesKey::new("44", "BOOKS"), monday, &[0.0, 0.0, 3.0, 0.0])
//!     .build()
//!     .unwrap();
//!
//! let mut engine = HybridForecastEngine::default();
//! engine.fit(panel).unwrap();
//! let table = engine.predict(4).unwrap();
//!
//! assert_eq!(table.len(), 8);
//! assert!(table.rows().iter().all(|r| r.predicted_demand >= 0.0));
//! ```

pub mod core;
pub mod error;
pub mod features;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, HistoryPanel, Observation, PanelSchema, SeriesKey, Table};
    pub use crate::error::{ForecastError, Result};
    pub use crate::features::{classify, DemandPattern};
    pub use crate::models::{Forecaster, ForecastTable, HybridConfig, HybridForecastEngine};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
    pub use crate::validation::{backtest, RollingOriginConfig, RollingOriginValidator};
}

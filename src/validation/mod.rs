//! Rolling-origin validation of weekly demand forecasts.
//!
//! [`RollingOriginValidator`] cuts a panel into expanding training windows
//! and fixed-length validation windows over its clean weekly timeline;
//! [`backtest`] scores the hybrid engine, and any benchmark models, on
//! those folds.

pub mod backtest;
pub mod rolling;

pub use backtest::{backtest, default_benchmarks, BacktestReport, FoldReport};
pub use rolling::{Fold, RollingFolds, RollingOriginConfig, RollingOriginValidator};

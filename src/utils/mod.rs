//! Utility functions for forecast evaluation.

pub mod metrics;

pub use metrics::{bias, calculate_metrics, mae, rmse, wape, AccuracyMetrics};

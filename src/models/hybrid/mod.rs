//! Piecewise hybrid forecasting: per-series classification and blending.

mod blend;
mod config;
mod engine;
mod table;

pub use blend::{BlendPolicy, BlendWeights};
pub use config::HybridConfig;
pub use engine::HybridForecastEngine;
pub use table::{ForecastRow, ForecastTable, SeriesDiagnostics};

//! Forecasting models.

mod traits;

pub mod baseline;
pub mod hybrid;
pub mod intermittent;

pub use hybrid::{
    BlendPolicy, BlendWeights, ForecastRow, ForecastTable, HybridConfig, HybridForecastEngine,
    SeriesDiagnostics,
};
pub use traits::{BoxedForecaster, Forecaster, ModelRegistry, ModelSpec, SeriesForecaster};

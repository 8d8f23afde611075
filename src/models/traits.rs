//! Forecaster traits shared by the baseline models and the hybrid engine.

use crate::core::{
    demand_sequence, Forecast, HistoryPanel, PanelForecast, SeriesForecast, SeriesKey,
};
use crate::error::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A forecasting strategy for one demand sequence.
///
/// Implementations are pure: the same values and horizon always give the same
/// trajectory, and an empty sequence gives zeros instead of an error.
pub trait SeriesForecaster {
    /// Forecast `horizon` steps from a chronologically ordered sequence.
    fn forecast_series(&self, values: &[f64], horizon: usize) -> Forecast;
}

/// Common interface for panel-wide forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Record per-series state from the panel.
    fn fit(&mut self, panel: &HistoryPanel) -> Result<()>;

    /// Generate `horizon` future values for every fitted series.
    fn predict(&self, horizon: usize) -> Result<PanelForecast>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use demand_hybrid::models::{BoxedForecaster, Forecaster};
/// use demand_hybrid::models::baseline::MovingAverage;
///
/// let model: BoxedForecaster = Box::new(MovingAverage::new(4));
/// assert_eq!(model.name(), "MovingAverage");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send + Sync>;

/// Per-series state recorded at fit time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FittedSeries<S> {
    pub last_week: NaiveDate,
    pub state: S,
}

/// Fit `state_of` on every series' demand sequence.
///
/// Series whose observations are all missing still get an entry, so they
/// forecast zeros instead of disappearing from the output.
pub(crate) fn fit_panel<S, F>(
    panel: &HistoryPanel,
    state_of: F,
) -> BTreeMap<SeriesKey, FittedSeries<S>>
where
    F: Fn(&[f64]) -> S,
{
    panel
        .iter_series()
        .filter_map(|(key, obs)| {
            let last_week = obs.last()?.week_start;
            let values = demand_sequence(obs);
            Some((
                key.clone(),
                FittedSeries {
                    last_week,
                    state: state_of(&values),
                },
            ))
        })
        .collect()
}

/// Expand fitted per-series state into a panel forecast.
pub(crate) fn predict_panel<S, F>(
    fitted: &BTreeMap<SeriesKey, FittedSeries<S>>,
    horizon: usize,
    forecast_of: F,
) -> PanelForecast
where
    F: Fn(&S, usize) -> Forecast,
{
    fitted
        .iter()
        .map(|(key, series)| {
            (
                key.clone(),
                SeriesForecast {
                    last_week: series.last_week,
                    forecast: forecast_of(&series.state, horizon),
                },
            )
        })
        .collect()
}

/// A named benchmark: builds a fresh, unfitted forecaster for every backtest fold.
///
/// # Example
///
/// ```
/// use demand_hybrid::models::baseline::SeasonalLookback;
/// use demand_hybrid::models::{Forecaster, ModelSpec};
///
/// let spec = ModelSpec::new("SeasonalLookback13", || Box::new(SeasonalLookback::new(13)));
/// assert!(!spec.create().is_fitted());
/// ```
pub struct ModelSpec {
    pub name: &'static str,
    factory: Box<dyn Fn() -> BoxedForecaster + Send + Sync>,
}

impl ModelSpec {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(factory),
        }
    }

    /// Build an unfitted model.
    pub fn create(&self) -> BoxedForecaster {
        (self.factory)()
    }
}

impl std::fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSpec").field("name", &self.name).finish()
    }
}

/// Benchmark models scored next to the hybrid engine, in registration order.
///
/// # Example
///
/// ```
/// use demand_hybrid::models::intermittent::Croston;
/// use demand_hybrid::models::{Forecaster, ModelRegistry, ModelSpec};
///
/// let mut registry = ModelRegistry::new();
/// registry.register(ModelSpec::new("CrostonSBA", || Box::new(Croston::new())));
/// assert_eq!(registry.iter().next().unwrap().create().name(), "CrostonSBA");
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ModelSpec) {
        self.models.push(spec);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }
}

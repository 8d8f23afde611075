//! Flat moving-average forecaster.
//!
//! Every future week is forecast as the mean of the last `window` observations.

use crate::core::{Forecast, HistoryPanel, PanelForecast, SeriesKey};
use crate::error::{ForecastError, Result};
use crate::models::traits::{fit_panel, predict_panel, FittedSeries};
use crate::models::{Forecaster, SeriesForecaster};
use std::collections::BTreeMap;

/// Default number of trailing weeks averaged.
pub const DEFAULT_WINDOW: usize = 4;

/// Mean of the last `min(window, len)` values; zero for an empty sequence.
///
/// A window of 0 averages the whole sequence.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let w = if window == 0 {
        values.len()
    } else {
        window.min(values.len())
    };
    values[values.len() - w..].iter().sum::<f64>() / w as f64
}

/// Moving-average forecaster.
///
/// # Example
/// ```
/// use demand_hybrid::models::baseline::MovingAverage;
/// use demand_hybrid::models::SeriesForecaster;
///
/// let model = MovingAverage::new(4);
/// let forecast = model.forecast_series(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 6.0], 3);
/// assert_eq!(forecast.values(), &[1.5, 1.5, 1.5]);
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize, // 0 means use all data
    levels: Option<BTreeMap<SeriesKey, FittedSeries<f64>>>,
}

impl MovingAverage {
    /// Create a new moving average with the given window size.
    /// Window of 0 means use the entire history.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            levels: None,
        }
    }

    /// Get the window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Fitted level of a series.
    pub fn level(&self, key: &SeriesKey) -> Option<f64> {
        self.levels.as_ref()?.get(key).map(|s| s.state)
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SeriesForecaster for MovingAverage {
    fn forecast_series(&self, values: &[f64], horizon: usize) -> Forecast {
        Forecast::flat(trailing_mean(values, self.window), horizon)
    }
}

impl Forecaster for MovingAverage {
    fn fit(&mut self, panel: &HistoryPanel) -> Result<()> {
        let window = self.window;
        self.levels = Some(fit_panel(panel, |values| trailing_mean(values, window)));
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<PanelForecast> {
        let levels = self.levels.as_ref().ok_or(ForecastError::FitRequired)?;
        Ok(predict_panel(levels, horizon, |&level, h| {
            Forecast::flat(level, h)
        }))
    }

    fn name(&self) -> &str {
        "MovingAverage"
    }

    fn is_fitted(&self) -> bool {
        self.levels.is_some()
    }
}

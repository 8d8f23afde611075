//! Croston's method for intermittent demand forecasting.
//!
//! Croston's method separately smooths the non-zero demand sizes and the
//! intervals between them, then divides one by the other to obtain a demand
//! rate. The Syntetos-Boylan Approximation (SBA) scales that rate by
//! `1 - alpha / 2` to remove its upward bias.

use crate::core::{Forecast, HistoryPanel, PanelForecast, SeriesKey};
use crate::error::{ForecastError, Result};
use crate::models::traits::{fit_panel, predict_panel, FittedSeries};
use crate::models::{Forecaster, SeriesForecaster};
use std::collections::BTreeMap;

/// Default smoothing constant for both sizes and intervals.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Croston's method variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrostonVariant {
    /// Classic Croston method.
    Classic,
    /// Syntetos-Boylan Approximation (SBA) - applies bias correction.
    SBA,
}

/// Smoothed state carried through the sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrostonState {
    /// Smoothed non-zero demand size (`Z`).
    pub demand_size: f64,
    /// Smoothed inter-demand interval (`P`).
    pub interval: f64,
    /// Periods since the last non-zero demand (`q`).
    pub periods_since_demand: f64,
}

impl CrostonState {
    /// State after the first demand, seen at zero-based `index`.
    fn start(demand: f64, index: usize) -> Self {
        let periods = (index + 1) as f64;
        Self {
            demand_size: demand,
            interval: periods,
            periods_since_demand: periods,
        }
    }

    fn update(self, y: f64, alpha: f64) -> Self {
        if y > 0.0 {
            Self {
                demand_size: alpha * y + (1.0 - alpha) * self.demand_size,
                interval: alpha * self.periods_since_demand + (1.0 - alpha) * self.interval,
                periods_since_demand: 1.0,
            }
        } else {
            Self {
                periods_since_demand: self.periods_since_demand + 1.0,
                ..self
            }
        }
    }

    /// Uncorrected demand rate `Z / P` (before SBA scaling).
    pub fn rate(&self) -> f64 {
        self.demand_size / self.interval
    }
}

/// Run the Croston recursion over a sequence.
///
/// Returns `None` when the sequence has no positive value.
pub fn croston_state(values: &[f64], alpha: f64) -> Option<CrostonState> {
    values
        .iter()
        .enumerate()
        .fold(None, |state, (i, &y)| match state {
            Some(s) => Some(CrostonState::update(s, y, alpha)),
            None if y > 0.0 => Some(CrostonState::start(y, i)),
            None => None,
        })
}

/// Croston's method for intermittent demand forecasting.
///
/// # Example
/// ```
/// use demand_hybrid::models::intermittent::Croston;
/// use demand_hybrid::models::SeriesForecaster;
///
/// let model = Croston::new();
/// let forecast = model.forecast_series(&[4.0, 0.0, 0.0, 7.0, 0.0, 8.0], 2);
/// assert!((forecast.values()[0] - 0.95 * 4.67 / 1.28).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Croston {
    /// Smoothing parameter (0.0 to 1.0).
    alpha: f64,
    /// Variant of Croston's method.
    variant: CrostonVariant,
    /// Per-series final state; `None` entries never saw demand.
    states: Option<BTreeMap<SeriesKey, FittedSeries<Option<CrostonState>>>>,
}

impl Croston {
    /// Create a Croston-SBA model with default alpha (0.1).
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            variant: CrostonVariant::SBA,
            states: None,
        }
    }

    /// Create Croston model with specified alpha.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.01, 0.99);
        self
    }

    /// Use the classic (uncorrected) variant.
    pub fn classic(mut self) -> Self {
        self.variant = CrostonVariant::Classic;
        self
    }

    /// Get the current alpha value.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the variant being used.
    pub fn variant(&self) -> CrostonVariant {
        self.variant
    }

    /// Fitted state of a series.
    pub fn state(&self, key: &SeriesKey) -> Option<CrostonState> {
        self.states.as_ref()?.get(key)?.state
    }

    /// Final forecast value for a state, after bias correction.
    fn demand_rate(&self, state: Option<&CrostonState>) -> f64 {
        let Some(state) = state else {
            return 0.0;
        };
        match self.variant {
            CrostonVariant::Classic => state.rate(),
            CrostonVariant::SBA => (1.0 - self.alpha / 2.0) * state.rate(),
        }
    }
}

impl Default for Croston {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesForecaster for Croston {
    fn forecast_series(&self, values: &[f64], horizon: usize) -> Forecast {
        let state = croston_state(values, self.alpha);
        Forecast::flat(self.demand_rate(state.as_ref()), horizon)
    }
}

impl Forecaster for Croston {
    fn fit(&mut self, panel: &HistoryPanel) -> Result<()> {
        let alpha = self.alpha;
        self.states = Some(fit_panel(panel, |values| croston_state(values, alpha)));
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<PanelForecast> {
        let states = self.states.as_ref().ok_or(ForecastError::FitRequired)?;
        Ok(predict_panel(states, horizon, |state, h| {
            Forecast::flat(self.demand_rate(state.as_ref()), h)
        }))
    }

    fn name(&self) -> &str {
        match self.variant {
            CrostonVariant::Classic => "Croston",
            CrostonVariant::SBA => "CrostonSBA",
        }
    }

    fn is_fitted(&self) -> bool {
        self.states.is_some()
    }
}

//! Piecewise hybrid forecasting engine.
//!
//! Each series is classified by its ADI / CV² quadrant and forecast with a
//! pattern-specific convex blend of a seasonal lookback and a flat moving
//! average:
//!
//! - intermittent and lumpy series use the moving average alone
//! - erratic series use `0.5 * seasonal + 0.5 * moving average`
//! - smooth series use `0.3 * seasonal + 0.7 * moving average`

use super::blend::BlendWeights;
use super::config::HybridConfig;
use super::table::{ForecastTable, SeriesDiagnostics};
use crate::core::{
    demand_sequence, Forecast, HistoryPanel, Observation, PanelSchema, SeriesKey, Table,
};
use crate::error::{ForecastError, Result};
use crate::features::{classify, Classification};
use crate::models::baseline::{MovingAverage, SeasonalLookback};
use crate::models::SeriesForecaster;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Forecasts a whole panel, choosing a strategy per series.
///
/// The engine holds the fitted panel and nothing else; classifications are
/// recomputed on every call to [`predict`](Self::predict).
///
/// # Example
///
/// ```
/// use demand_hybrid::core::{HistoryPanel, SeriesKey};
/// use demand_hybrid::features::DemandPattern;
/// use demand_hybrid::models::HybridForecastEngine;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
/// let key = SeriesKey::new("1", "CLEANING");
/// let panel = HistoryPanel::builder()
///     .weekly_series(key.clone(), monday, &[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 6.0])
///     .build()
///     .unwrap();
///
/// let mut engine = HybridForecastEngine::default();
/// engine.fit(panel).unwrap();
/// let table = engine.predict(2).unwrap();
///
/// assert_eq!(table.diagnostics(&key).unwrap().pattern(), DemandPattern::Intermittent);
/// assert!(table.rows().iter().all(|r| r.predicted_demand == 1.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HybridForecastEngine {
    config: HybridConfig,
    history: Option<HistoryPanel>,
}

/// Forecast and diagnostics of one series before assembly into a table.
struct SeriesOutcome {
    diagnostics: SeriesDiagnostics,
    forecast: Forecast,
}

impl HybridForecastEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: HybridConfig) -> Self {
        Self {
            config,
            history: None,
        }
    }

    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    /// The fitted panel, if any.
    pub fn history(&self) -> Option<&HistoryPanel> {
        self.history.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.history.is_some()
    }

    /// Store the panel to forecast from. Statistics are computed at predict time.
    pub fn fit(&mut self, panel: HistoryPanel) -> Result<()> {
        if panel.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        log::debug!(
            "hybrid engine fitted on {} observations across {} series",
            panel.len(),
            panel.n_series()
        );
        self.history = Some(panel);
        Ok(())
    }

    /// Read the panel from a table and fit on it.
    ///
    /// Fails with [`ForecastError::MissingColumn`] when the table has no demand column.
    pub fn fit_table(&mut self, table: &Table, schema: &PanelSchema) -> Result<()> {
        self.fit(HistoryPanel::from_table(table, schema)?)
    }

    /// Forecast `horizon` weeks for every series of the fitted panel.
    pub fn predict(&self, horizon: usize) -> Result<ForecastTable> {
        let panel = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        check_horizon(horizon)?;

        let series: Vec<(&SeriesKey, &[Observation])> = panel.iter_series().collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<SeriesOutcome> = series
            .par_iter()
            .map(|(key, obs)| self.forecast_series(key, obs, horizon))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<SeriesOutcome> = series
            .iter()
            .map(|(key, obs)| self.forecast_series(key, obs, horizon))
            .collect::<Result<Vec<_>>>()?;

        let mut table = ForecastTable::new(horizon);
        for outcome in outcomes {
            table.push_series(outcome.diagnostics, &outcome.forecast);
        }

        log::info!(
            "hybrid forecast: {} series, {} rows, patterns {:?}",
            table.n_series(),
            table.len(),
            table.pattern_counts()
        );
        Ok(table)
    }

    /// Forecast a single series of the fitted panel.
    pub fn predict_series(&self, key: &SeriesKey, horizon: usize) -> Result<ForecastTable> {
        let panel = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        check_horizon(horizon)?;
        let observations = panel
            .series(key)
            .ok_or_else(|| ForecastError::UnknownSeries(key.to_string()))?;

        let outcome = self.forecast_series(key, observations, horizon)?;
        let mut table = ForecastTable::new(horizon);
        table.push_series(outcome.diagnostics, &outcome.forecast);
        Ok(table)
    }

    /// Classify the sequence and blend both baselines by its pattern.
    fn forecast_series(
        &self,
        key: &SeriesKey,
        observations: &[Observation],
        horizon: usize,
    ) -> Result<SeriesOutcome> {
        let last_week = observations
            .last()
            .map(|o| o.week_start)
            .ok_or(ForecastError::EmptyData)?;
        let values = demand_sequence(observations);

        let (classification, weights, forecast) = self.blend(&values, horizon)?;
        log::trace!(
            "{key}: {} (adi={:.3}, cv2={:.3})",
            classification.pattern,
            classification.adi,
            classification.cv2
        );

        Ok(SeriesOutcome {
            diagnostics: SeriesDiagnostics {
                key: key.clone(),
                classification,
                weights,
                last_week,
            },
            forecast,
        })
    }

    fn blend(
        &self,
        values: &[f64],
        horizon: usize,
    ) -> Result<(Classification, BlendWeights, Forecast)> {
        let classification = classify(values, &self.config.thresholds);

        // Both components are always computed; the weights decide which count.
        let moving_average =
            MovingAverage::new(self.config.ma_window).forecast_series(values, horizon);
        let seasonal =
            SeasonalLookback::new(self.config.season_length).forecast_series(values, horizon);

        let weights = self.config.blend.weights(classification.pattern);
        let forecast = weights
            .apply(&seasonal, &moving_average)?
            .clip_non_negative();
        Ok((classification, weights, forecast))
    }
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be at least one week".to_string(),
        ));
    }
    Ok(())
}

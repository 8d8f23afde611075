//! Seasonal lookback forecasting model.
//!
//! Forecasts by replaying the weeks that followed the same point one season ago.

use crate::core::{Forecast, HistoryPanel, PanelForecast, SeriesKey};
use crate::error::{ForecastError, Result};
use crate::models::traits::{fit_panel, predict_panel, FittedSeries};
use crate::models::{Forecaster, SeriesForecaster};
use std::collections::BTreeMap;

/// Default season length for weekly data.
pub const DEFAULT_SEASON_LENGTH: usize = 52;

/// Seasonal lookback trajectory for one sequence.
///
/// Step `h` takes the value at `len - season_length + h`. Steps that would run
/// past the end of history wrap around within the last season. Sequences
/// shorter than one season (and a season length of 0) repeat the last value
/// instead; an empty sequence gives zeros.
pub fn seasonal_lookback(values: &[f64], season_length: usize, horizon: usize) -> Forecast {
    let n = values.len();
    if season_length == 0 || n < season_length {
        return Forecast::flat(values.last().copied().unwrap_or(0.0), horizon);
    }
    let start = n - season_length;
    let predictions = (0..horizon)
        .map(|h| values[start + (h % season_length)])
        .collect();
    Forecast::from_values(predictions)
}

/// Seasonal lookback forecaster.
///
/// Each forecast equals the observation from the same week one season earlier.
#[derive(Debug, Clone)]
pub struct SeasonalLookback {
    season_length: usize,
    history: Option<BTreeMap<SeriesKey, FittedSeries<Vec<f64>>>>,
}

impl SeasonalLookback {
    /// Create a new model with the given season length.
    pub fn new(season_length: usize) -> Self {
        Self {
            season_length,
            history: None,
        }
    }

    /// Get the season length.
    pub fn season_length(&self) -> usize {
        self.season_length
    }
}

impl Default for SeasonalLookback {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON_LENGTH)
    }
}

impl SeriesForecaster for SeasonalLookback {
    fn forecast_series(&self, values: &[f64], horizon: usize) -> Forecast {
        seasonal_lookback(values, self.season_length, horizon)
    }
}

impl Forecaster for SeasonalLookback {
    fn fit(&mut self, panel: &HistoryPanel) -> Result<()> {
        let season_length = self.season_length;
        // Only the last season is ever read back.
        self.history = Some(fit_panel(panel, |values| {
            if season_length > 0 && values.len() >= season_length {
                values[values.len() - season_length..].to_vec()
            } else {
                values.last().map(|&v| vec![v]).unwrap_or_default()
            }
        }));
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<PanelForecast> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let season_length = self.season_length;
        Ok(predict_panel(history, horizon, |tail, h| {
            seasonal_lookback(tail, season_length, h)
        }))
    }

    fn name(&self) -> &str {
        "SeasonalLookback"
    }

    fn is_fitted(&self) -> bool {
        self.history.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn lookback_replays_last_season() {
        // Period of 4: [1, 2, 3, 4, 5, 6, 7, 8]
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(seasonal_lookback(&values, 4, 4).values(), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn lookback_reads_the_window_one_season_back() {
        // 60 weeks, season 52: steps come from positions 8..12.
        let values: Vec<f64> = (0..60).map(|i| i as f64).collect();
        assert_eq!(
            seasonal_lookback(&values, 52, 4).values(),
            &[8.0, 9.0, 10.0, 11.0]
        );
    }

    #[test]
    fn lookback_wraps_beyond_one_season() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let forecast = seasonal_lookback(&values, 4, 8);
        assert_eq!(&forecast.values()[0..4], &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(&forecast.values()[4..8], &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn short_history_repeats_last_value() {
        assert_eq!(seasonal_lookback(&[3.0, 9.0], 52, 3).values(), &[9.0, 9.0, 9.0]);
        assert_eq!(seasonal_lookback(&[], 52, 2).values(), &[0.0, 0.0]);
        assert_eq!(seasonal_lookback(&[3.0, 9.0], 0, 1).values(), &[9.0]);
    }

    #[test]
    fn exactly_one_season_starts_at_the_beginning() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(seasonal_lookback(&values, 3, 2).values(), &[1.0, 2.0]);
    }

    #[test]
    fn panel_predictions_match_series_function() {
        let monday = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
        let long = SeriesKey::new("3", "PRODUCE");
        let short = SeriesKey::new("4", "PRODUCE");
        let long_values: Vec<f64> = (0..10).map(|i| (i % 5) as f64).collect();
        let panel = HistoryPanel::builder()
            .weekly_series(long.clone(), monday, &long_values)
            .weekly_series(short.clone(), monday, &[2.0, 7.0])
            .build()
            .unwrap();

        let mut model = SeasonalLookback::new(5);
        model.fit(&panel).unwrap();
        let forecast = model.predict(7).unwrap();

        assert_eq!(
            forecast.get(&long).unwrap().forecast,
            seasonal_lookback(&long_values, 5, 7)
        );
        assert_eq!(
            forecast.get(&short).unwrap().forecast.values(),
            &[7.0; 7]
        );
    }

    #[test]
    fn seasonal_lookback_requires_fit() {
        let model = SeasonalLookback::default();
        assert!(matches!(model.predict(8), Err(ForecastError::FitRequired)));
        assert_eq!(model.season_length(), 52);
        assert_eq!(model.name(), "SeasonalLookback");
    }
}

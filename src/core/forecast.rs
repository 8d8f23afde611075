//! Forecast structures: a single trajectory and a panel of trajectories.

use crate::core::panel::SeriesKey;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Point predictions for one series, one value per future week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    values: Vec<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Constant trajectory of `horizon` steps.
    pub fn flat(value: f64, horizon: usize) -> Self {
        Self {
            values: vec![value; horizon],
        }
    }

    /// All-zero trajectory, the fallback for series without usable history.
    pub fn zeros(horizon: usize) -> Self {
        Self::flat(0.0, horizon)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Convex combination `self_weight * self + other_weight * other`.
    ///
    /// # Example
    ///
    /// ```
    /// use demand_hybrid::core::Forecast;
    ///
    /// let seasonal = Forecast::from_values(vec![20.0, 0.0]);
    /// let flat = Forecast::flat(10.0, 2);
    /// let blended = seasonal.blend(0.3, &flat, 0.7).unwrap();
    /// assert_eq!(blended.values(), &[13.0, 7.0]);
    /// ```
    pub fn blend(&self, self_weight: f64, other: &Forecast, other_weight: f64) -> Result<Forecast> {
        if self.horizon() != other.horizon() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.horizon(),
                got: other.horizon(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| self_weight * a + other_weight * b)
            .collect();
        Ok(Forecast { values })
    }

    /// Replace negative (and NaN) predictions with zero.
    pub fn clip_non_negative(mut self) -> Self {
        for v in &mut self.values {
            // `max` maps NaN to 0.0 as well.
            *v = v.max(0.0);
        }
        self
    }
}

/// The `horizon` Mondays following `last_week`.
pub fn future_weeks(last_week: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|i| last_week + Duration::weeks(i as i64))
        .collect()
}

/// Forecast of a single series anchored at its last observed week.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesForecast {
    /// Latest week present in the series' history.
    pub last_week: NaiveDate,
    pub forecast: Forecast,
}

impl SeriesForecast {
    /// Pair each predicted value with its forecast week.
    pub fn dated(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        future_weeks(self.last_week, self.forecast.horizon())
            .into_iter()
            .zip(self.forecast.values().iter().copied())
    }
}

/// Forecasts for every series of a panel, ordered by series key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelForecast {
    series: BTreeMap<SeriesKey, SeriesForecast>,
}

impl PanelForecast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SeriesKey, forecast: SeriesForecast) {
        self.series.insert(key, forecast);
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&SeriesForecast> {
        self.series.get(key)
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &SeriesForecast)> {
        self.series.iter()
    }

    /// Predicted value for a series at a given forecast week.
    pub fn value_at(&self, key: &SeriesKey, week: NaiveDate) -> Option<f64> {
        self.series
            .get(key)?
            .dated()
            .find(|(w, _)| *w == week)
            .map(|(_, v)| v)
    }
}

impl FromIterator<(SeriesKey, SeriesForecast)> for PanelForecast {
    fn from_iter<I: IntoIterator<Item = (SeriesKey, SeriesForecast)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 8, 7).unwrap()
    }

    #[test]
    fn flat_and_zero_forecasts() {
        assert_eq!(Forecast::flat(1.5, 3).values(), &[1.5, 1.5, 1.5]);
        assert_eq!(Forecast::zeros(2).values(), &[0.0, 0.0]);
        assert!(Forecast::new().is_empty());
        assert_eq!(Forecast::zeros(0).horizon(), 0);
    }

    #[test]
    fn blend_requires_equal_horizons() {
        let a = Forecast::flat(1.0, 3);
        let b = Forecast::flat(1.0, 2);
        assert!(matches!(
            a.blend(0.5, &b, 0.5),
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn clipping_removes_negatives_and_nan() {
        let f = Forecast::from_values(vec![-1.0, 2.0, f64::NAN]).clip_non_negative();
        assert_eq!(f.values(), &[0.0, 2.0, 0.0]);
    }

    #[test]
    fn into_values_hands_back_the_trajectory() {
        let f = Forecast::from_values(vec![3.0, 1.0]);
        assert_eq!(f.into_values(), vec![3.0, 1.0]);
        assert!(Forecast::zeros(0).into_values().is_empty());
    }

    #[test]
    fn future_weeks_are_consecutive_mondays() {
        let weeks = future_weeks(monday(), 3);
        assert_eq!(
            weeks,
            vec![
                NaiveDate::from_ymd_opt(2017, 8, 14).unwrap(),
                NaiveDate::from_ymd_opt(2017, 8, 21).unwrap(),
                NaiveDate::from_ymd_opt(2017, 8, 28).unwrap(),
            ]
        );
        assert!(future_weeks(monday(), 0).is_empty());
    }

    #[test]
    fn panel_forecast_lookup_by_week() {
        let key = SeriesKey::new("1", "BEVERAGES");
        let panel: PanelForecast = vec![(
            key.clone(),
            SeriesForecast {
                last_week: monday(),
                forecast: Forecast::from_values(vec![3.0, 4.0]),
            },
        )]
        .into_iter()
        .collect();

        assert_eq!(panel.len(), 1);
        assert_eq!(
            panel.value_at(&key, NaiveDate::from_ymd_opt(2017, 8, 21).unwrap()),
            Some(4.0)
        );
        assert_eq!(panel.value_at(&key, monday()), None);
    }
}

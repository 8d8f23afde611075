//! Panel-wide output of the hybrid engine.

use super::blend::BlendWeights;
use crate::core::{Forecast, PanelForecast, SeriesForecast, SeriesKey};
use crate::features::{Classification, DemandPattern};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::Range;

/// One predicted week of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub key: SeriesKey,
    pub forecast_week_start: NaiveDate,
    /// Never negative.
    pub predicted_demand: f64,
    pub pattern: DemandPattern,
}

/// How a series was classified and which blend it received.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDiagnostics {
    pub key: SeriesKey,
    pub classification: Classification,
    pub weights: BlendWeights,
    /// Latest week in the series' history; forecasts start the week after.
    pub last_week: NaiveDate,
}

impl SeriesDiagnostics {
    pub fn pattern(&self) -> DemandPattern {
        self.classification.pattern
    }
}

/// Forecast rows for every series plus the per-series diagnostics.
///
/// Rows are ordered by series key, then forecast week, so each series
/// occupies one contiguous run of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    horizon: usize,
    rows: Vec<ForecastRow>,
    diagnostics: BTreeMap<SeriesKey, SeriesDiagnostics>,
    series: BTreeMap<SeriesKey, Range<usize>>,
}

impl ForecastTable {
    pub(crate) fn new(horizon: usize) -> Self {
        Self {
            horizon,
            rows: Vec::new(),
            diagnostics: BTreeMap::new(),
            series: BTreeMap::new(),
        }
    }

    /// Append one series. Must be called in key order.
    pub(crate) fn push_series(&mut self, diagnostics: SeriesDiagnostics, forecast: &Forecast) {
        let series = SeriesForecast {
            last_week: diagnostics.last_week,
            forecast: forecast.clone(),
        };
        let start = self.rows.len();
        self.rows
            .extend(series.dated().map(|(week, value)| ForecastRow {
                key: diagnostics.key.clone(),
                forecast_week_start: week,
                predicted_demand: value,
                pattern: diagnostics.pattern(),
            }));
        self.series.insert(diagnostics.key.clone(), start..self.rows.len());
        self.diagnostics.insert(diagnostics.key.clone(), diagnostics);
    }

    /// Number of weeks forecast per series.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// All rows.
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of series forecast.
    pub fn n_series(&self) -> usize {
        self.diagnostics.len()
    }

    /// Rows of a single series; empty for an unknown key.
    pub fn for_series(&self, key: &SeriesKey) -> &[ForecastRow] {
        match self.series.get(key) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Diagnostics of a single series.
    pub fn diagnostics(&self, key: &SeriesKey) -> Option<&SeriesDiagnostics> {
        self.diagnostics.get(key)
    }

    /// Diagnostics of every series in key order.
    pub fn iter_diagnostics(&self) -> impl Iterator<Item = &SeriesDiagnostics> {
        self.diagnostics.values()
    }

    /// Number of series per demand pattern. Patterns without series are omitted.
    pub fn pattern_counts(&self) -> BTreeMap<DemandPattern, usize> {
        let mut counts = BTreeMap::new();
        for d in self.diagnostics.values() {
            *counts.entry(d.pattern()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of all predicted demand.
    pub fn total_demand(&self) -> f64 {
        self.rows.iter().map(|r| r.predicted_demand).sum()
    }

    /// Re-group the rows into per-series trajectories.
    pub fn to_panel_forecast(&self) -> PanelForecast {
        self.diagnostics
            .iter()
            .map(|(key, d)| {
                let values = self
                    .for_series(key)
                    .iter()
                    .map(|r| r.predicted_demand)
                    .collect();
                (
                    key.clone(),
                    SeriesForecast {
                        last_week: d.last_week,
                        forecast: Forecast::from_values(values),
                    },
                )
            })
            .collect()
    }
}

//! Backtest of the hybrid engine over rolling-origin folds.

use super::rolling::{Fold, RollingOriginValidator};
use crate::core::{HistoryPanel, PanelForecast};
use crate::error::Result;
use crate::models::baseline::{SeasonalLookback, DEFAULT_SEASON_LENGTH};
use crate::models::{HybridConfig, HybridForecastEngine, ModelRegistry, ModelSpec};
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Scores of one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldReport {
    /// Zero-based fold number.
    pub index: usize,
    pub train_end: NaiveDate,
    pub validation_start: NaiveDate,
    pub validation_end: NaiveDate,
    /// Validation rows that received a hybrid prediction.
    pub matched_rows: usize,
    /// Hybrid accuracy; `None` when no row matched.
    pub hybrid: Option<AccuracyMetrics>,
    /// Benchmark accuracy on the same rows, by model name.
    pub benchmarks: BTreeMap<String, AccuracyMetrics>,
}

/// Result of a full backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub folds: Vec<FoldReport>,
    /// Hybrid accuracy over the rows of every fold pooled together.
    pub hybrid: Option<AccuracyMetrics>,
    /// Pooled benchmark accuracy, by model name.
    pub benchmarks: BTreeMap<String, AccuracyMetrics>,
}

impl BacktestReport {
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Pooled WAPE of the hybrid engine.
    pub fn hybrid_wape(&self) -> Option<f64> {
        self.hybrid.as_ref().and_then(|m| m.wape)
    }

    /// Pooled WAPE of a benchmark.
    pub fn benchmark_wape(&self, name: &str) -> Option<f64> {
        self.benchmarks.get(name).and_then(|m| m.wape)
    }
}

/// The seasonal-lookback benchmark the hybrid engine is usually judged against.
pub fn default_benchmarks() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.register(ModelSpec::new("SeasonalLookback", || {
        Box::new(SeasonalLookback::new(DEFAULT_SEASON_LENGTH))
    }));
    registry
}

/// Paired actual/predicted values of one model.
#[derive(Debug, Default)]
struct Pairs {
    actual: Vec<f64>,
    predicted: Vec<f64>,
}

impl Pairs {
    fn push(&mut self, actual: f64, predicted: f64) {
        self.actual.push(actual);
        self.predicted.push(predicted);
    }

    fn extend(&mut self, other: &Pairs) {
        self.actual.extend_from_slice(&other.actual);
        self.predicted.extend_from_slice(&other.predicted);
    }

    fn metrics(&self) -> Result<Option<AccuracyMetrics>> {
        if self.actual.is_empty() {
            return Ok(None);
        }
        calculate_metrics(&self.actual, &self.predicted).map(Some)
    }
}

/// Run the hybrid engine, and every benchmark, over each fold of `panel`.
///
/// Every fold fits fresh models on its training rows, forecasts the
/// validation horizon and joins the predictions to the validation actuals on
/// (series, week). Validation rows with missing demand or without a
/// prediction are not scored.
///
/// # Example
///
/// ```
/// use demand_hybrid::core::{HistoryPanel, SeriesKey};
/// use demand_hybrid::models::HybridConfig;
/// use demand_hybrid::validation::{
///     backtest, default_benchmarks, RollingOriginConfig, RollingOriginValidator,
/// };
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
/// let panel = HistoryPanel::builder()
///     .weekly_series(SeriesKey::new("1", "EGGS"), monday, &[10.0; 64])
///     .build()
///     .unwrap();
///
/// let validator = RollingOriginValidator::new(RollingOriginConfig::default()).unwrap();
/// let report =
///     backtest(&validator, &panel, &HybridConfig::default(), &default_benchmarks()).unwrap();
///
/// assert_eq!(report.n_folds(), 2);
/// assert!(report.hybrid_wape().unwrap() < 1e-9);
/// ```
pub fn backtest(
    validator: &RollingOriginValidator,
    panel: &HistoryPanel,
    config: &HybridConfig,
    benchmarks: &ModelRegistry,
) -> Result<BacktestReport> {
    let horizon = validator.config().horizon;
    let mut folds = Vec::new();
    let mut pooled_hybrid = Pairs::default();
    let mut pooled_benchmarks: BTreeMap<String, Pairs> = BTreeMap::new();

    for fold in validator.folds(panel)? {
        let train = fold.train.to_panel();

        let mut engine = HybridForecastEngine::new(*config);
        engine.fit(train.clone())?;
        let hybrid_forecast = engine.predict(horizon)?.to_panel_forecast();

        let mut benchmark_forecasts = Vec::with_capacity(benchmarks.len());
        for spec in benchmarks.iter() {
            let mut model = spec.create();
            model.fit(&train)?;
            benchmark_forecasts.push((spec.name, model.predict(horizon)?));
        }

        let (hybrid_pairs, benchmark_pairs) =
            join_fold(&fold, &hybrid_forecast, &benchmark_forecasts);

        let report = FoldReport {
            index: fold.index,
            train_end: fold.train_end,
            validation_start: fold.validation_start,
            validation_end: fold.validation_end,
            matched_rows: hybrid_pairs.actual.len(),
            hybrid: hybrid_pairs.metrics()?,
            benchmarks: score_all(&benchmark_pairs)?,
        };
        log::debug!(
            "fold {}: {} rows scored, hybrid wape={:?}",
            fold.index + 1,
            report.matched_rows,
            report.hybrid.as_ref().and_then(|m| m.wape)
        );

        pooled_hybrid.extend(&hybrid_pairs);
        for (name, pairs) in &benchmark_pairs {
            pooled_benchmarks
                .entry(name.clone())
                .or_default()
                .extend(pairs);
        }
        folds.push(report);
    }

    Ok(BacktestReport {
        folds,
        hybrid: pooled_hybrid.metrics()?,
        benchmarks: score_all(&pooled_benchmarks)?,
    })
}

/// Pair validation actuals with the hybrid and benchmark predictions.
///
/// A row is scored for the hybrid engine when it has finite demand and a
/// hybrid prediction; benchmarks are scored on that same set of rows.
fn join_fold(
    fold: &Fold<'_>,
    hybrid: &PanelForecast,
    benchmarks: &[(&'static str, PanelForecast)],
) -> (Pairs, BTreeMap<String, Pairs>) {
    let mut hybrid_pairs = Pairs::default();
    let mut benchmark_pairs: BTreeMap<String, Pairs> = benchmarks
        .iter()
        .map(|(name, _)| (name.to_string(), Pairs::default()))
        .collect();

    for obs in fold.validation.iter().filter(|o| o.demand.is_finite()) {
        let Some(predicted) = hybrid.value_at(&obs.key, obs.week_start) else {
            continue;
        };
        hybrid_pairs.push(obs.demand, predicted);

        for (name, forecast) in benchmarks {
            if let (Some(value), Some(pairs)) = (
                forecast.value_at(&obs.key, obs.week_start),
                benchmark_pairs.get_mut(*name),
            ) {
                pairs.push(obs.demand, value);
            }
        }
    }
    (hybrid_pairs, benchmark_pairs)
}

fn score_all(pairs: &BTreeMap<String, Pairs>) -> Result<BTreeMap<String, AccuracyMetrics>> {
    let mut scores = BTreeMap::new();
    for (name, p) in pairs {
        if let Some(metrics) = p.metrics()? {
            scores.insert(name.clone(), metrics);
        }
    }
    Ok(scores)
}

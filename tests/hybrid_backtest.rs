//! End-to-end tests: table input, hybrid forecasting, benchmarks and backtest.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use demand_hybrid::core::{Column, HistoryPanel, PanelSchema, SeriesKey, Table};
use demand_hybrid::features::DemandPattern;
use demand_hybrid::models::baseline::{MovingAverage, SeasonalLookback};
use demand_hybrid::models::intermittent::Croston;
use demand_hybrid::models::{
    Forecaster, HybridConfig, HybridForecastEngine, ModelRegistry, ModelSpec,
};
use demand_hybrid::validation::{
    backtest, default_benchmarks, RollingOriginConfig, RollingOriginValidator,
};
use demand_hybrid::ForecastError;

fn monday(i: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 4).unwrap() + Duration::weeks(i)
}

/// Weekly panel with one series of each demand pattern.
fn mixed_panel(n_weeks: usize) -> HistoryPanel {
    let smooth: Vec<f64> = (0..n_weeks).map(|i| 100.0 + (i % 4) as f64).collect();
    let erratic: Vec<f64> = (0..n_weeks)
        .map(|i| if i % 3 == 0 { 80.0 } else { 10.0 })
        .collect();
    let intermittent: Vec<f64> = (0..n_weeks)
        .map(|i| if i % 4 == 0 { 5.0 } else { 0.0 })
        .collect();
    let lumpy: Vec<f64> = (0..n_weeks)
        .map(|i| match i % 6 {
            0 => 40.0,
            3 => 2.0,
            _ => 0.0,
        })
        .collect();

    HistoryPanel::builder()
        .weekly_series(SeriesKey::new("1", "A_SMOOTH"), monday(0), &smooth)
        .weekly_series(SeriesKey::new("1", "B_ERRATIC"), monday(0), &erratic)
        .weekly_series(SeriesKey::new("1", "C_INTERMITTENT"), monday(0), &intermittent)
        .weekly_series(SeriesKey::new("1", "D_LUMPY"), monday(0), &lumpy)
        .build()
        .unwrap()
}

#[test]
fn every_pattern_is_recognised_across_the_panel() {
    let mut engine = HybridForecastEngine::default();
    engine.fit(mixed_panel(60)).unwrap();
    let table = engine.predict(8).unwrap();

    let patterns: Vec<_> = table.iter_diagnostics().map(|d| d.pattern()).collect();
    assert_eq!(
        patterns,
        vec![
            DemandPattern::Smooth,
            DemandPattern::Erratic,
            DemandPattern::Intermittent,
            DemandPattern::Lumpy,
        ]
    );
    assert_eq!(table.len(), 32);
    assert_eq!(table.rows()[0].forecast_week_start, monday(60));
    assert_eq!(table.rows()[31].forecast_week_start, monday(67));
}

#[test]
fn scenario_intermittent_series_uses_the_moving_average() {
    let key = SeriesKey::new("7", "HARDWARE");
    let panel = HistoryPanel::builder()
        .weekly_series(key.clone(), monday(0), &[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 6.0])
        .build()
        .unwrap();

    let mut engine = HybridForecastEngine::default();
    engine.fit(panel).unwrap();
    let table = engine.predict(3).unwrap();

    let diag = table.diagnostics(&key).unwrap();
    assert_eq!(diag.pattern(), DemandPattern::Intermittent);
    assert_relative_eq!(diag.classification.adi, 4.0);
    assert_relative_eq!(diag.classification.cv2, 0.25 / 30.25, epsilon = 1e-12);
    for row in table.rows() {
        assert_relative_eq!(row.predicted_demand, 1.5);
    }
}

#[test]
fn scenario_constant_series_is_smooth_and_flat() {
    let key = SeriesKey::new("3", "BREAD/BAKERY");
    let panel = HistoryPanel::builder()
        .weekly_series(key.clone(), monday(0), &[10.0; 60])
        .build()
        .unwrap();

    let mut engine = HybridForecastEngine::default();
    engine.fit(panel).unwrap();
    let table = engine.predict(4).unwrap();

    assert_eq!(table.diagnostics(&key).unwrap().pattern(), DemandPattern::Smooth);
    for row in table.rows() {
        assert_relative_eq!(row.predicted_demand, 10.0, epsilon = 1e-9);
    }
}

#[test]
fn scenario_croston_sba_forecast() {
    let key = SeriesKey::new("9", "AUTOMOTIVE");
    let panel = HistoryPanel::builder()
        .weekly_series(key.clone(), monday(0), &[4.0, 0.0, 0.0, 7.0, 0.0, 8.0])
        .build()
        .unwrap();

    let mut model = Croston::new();
    model.fit(&panel).unwrap();
    let forecast = model.predict(3).unwrap();

    let expected = 0.95 * 4.67 / 1.28;
    let series = forecast.get(&key).unwrap();
    assert_eq!(series.forecast.horizon(), 3);
    for value in series.forecast.values() {
        assert_relative_eq!(*value, expected, epsilon = 1e-9);
    }
    assert_eq!(forecast.value_at(&key, monday(6)), Some(series.forecast.values()[0]));
}

#[test]
fn table_input_flows_through_to_forecasts() {
    let weeks: Vec<NaiveDate> = (0..6).map(monday).collect();
    let table = Table::new()
        .with_column("store_nbr", Column::Text(vec!["12".to_string(); 6]))
        .unwrap()
        .with_column("family", Column::Text(vec!["BEVERAGES".to_string(); 6]))
        .unwrap()
        .with_column("week_start", Column::Date(weeks))
        .unwrap()
        .with_column("sales", Column::Number(vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]))
        .unwrap()
        .with_column("onpromotion", Column::Number(vec![0.0, 1.0, 0.0, 0.0, 2.0, 0.0]))
        .unwrap();
    let schema = PanelSchema::default()
        .with_key_columns("store_nbr", "family")
        .with_demand_column("sales");

    let mut engine = HybridForecastEngine::default();
    engine.fit_table(&table, &schema).unwrap();

    let key = SeriesKey::new("12", "BEVERAGES");
    let obs = engine.history().unwrap().series(&key).unwrap();
    assert_eq!(obs[4].auxiliary.get("onpromotion"), Some(&2.0));

    let forecast = engine.predict_series(&key, 2).unwrap();
    assert_eq!(forecast.len(), 2);

    let err = engine
        .fit_table(&table, &PanelSchema::default().with_key_columns("store_nbr", "family"))
        .unwrap_err();
    assert_eq!(err, ForecastError::MissingColumn("demand".to_string()));
}

#[test]
fn baselines_share_the_forecaster_interface() {
    let panel = mixed_panel(30);
    let models: Vec<Box<dyn Forecaster>> = vec![
        Box::new(MovingAverage::default()),
        Box::new(SeasonalLookback::new(13)),
        Box::new(Croston::new()),
    ];
    for mut model in models {
        assert!(matches!(model.predict(4), Err(ForecastError::FitRequired)));
        model.fit(&panel).unwrap();
        let forecast = model.predict(4).unwrap();
        assert_eq!(forecast.len(), 4, "{}", model.name());
        for (_, series) in forecast.iter() {
            assert_eq!(series.forecast.horizon(), 4);
            assert!(series.forecast.values().iter().all(|v| *v >= 0.0));
        }
    }
}

#[test]
fn validator_scenarios_sixty_and_sixty_four_weeks() {
    let validator = RollingOriginValidator::new(RollingOriginConfig::default()).unwrap();

    let sixty = mixed_panel(60);
    let folds: Vec<_> = validator.folds(&sixty).unwrap().collect();
    assert_eq!(folds.len(), 1);
    assert_eq!(folds[0].train.len(), 52 * 4);
    assert_eq!(folds[0].validation.len(), 8 * 4);

    let sixty_four = mixed_panel(64);
    assert_eq!(validator.folds(&sixty_four).unwrap().count(), 2);
}

#[test]
fn backtest_scores_hybrid_against_benchmarks() {
    let panel = mixed_panel(72);
    let validator = RollingOriginValidator::new(RollingOriginConfig::default()).unwrap();

    let mut benchmarks = default_benchmarks();
    benchmarks.register(ModelSpec::new("CrostonSBA", || Box::new(Croston::new())));

    let report = backtest(&validator, &panel, &HybridConfig::default(), &benchmarks).unwrap();

    assert_eq!(report.n_folds(), 4);
    for fold in &report.folds {
        assert_eq!(fold.matched_rows, 32);
        assert_eq!(fold.benchmarks.len(), 2);
        assert!(fold.hybrid.as_ref().unwrap().wape.is_some());
    }
    let pooled = report.hybrid.as_ref().unwrap();
    assert_eq!(pooled.n, 4 * 32);
    assert!(pooled.mae.is_finite() && pooled.rmse >= pooled.mae);
    assert!(report.benchmark_wape("SeasonalLookback").is_some());
    assert!(report.benchmark_wape("CrostonSBA").is_some());
}

#[test]
fn backtest_without_benchmarks_reports_hybrid_only() {
    let panel = mixed_panel(64);
    let report = backtest(
        &RollingOriginValidator::default(),
        &panel,
        &HybridConfig::default(),
        &ModelRegistry::new(),
    )
    .unwrap();
    assert_eq!(report.n_folds(), 2);
    assert!(report.benchmarks.is_empty());
    assert!(report.hybrid_wape().is_some());
}

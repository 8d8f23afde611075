//! Rolling-origin splits of a weekly panel.

use crate::core::{HistoryPanel, PanelSlice};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Configuration for rolling-origin cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingOriginConfig {
    /// Weeks in the first training window.
    pub min_train_weeks: usize,
    /// Weeks in every validation window.
    pub horizon: usize,
    /// Weeks the cutoff advances between folds.
    pub step: usize,
}

impl Default for RollingOriginConfig {
    fn default() -> Self {
        Self {
            min_train_weeks: 52,
            horizon: 8,
            step: 4,
        }
    }
}

impl RollingOriginConfig {
    /// Create a configuration, rejecting zero-sized windows and a zero step.
    pub fn new(min_train_weeks: usize, horizon: usize, step: usize) -> Result<Self> {
        let config = Self {
            min_train_weeks,
            horizon,
            step,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the size of the first training window.
    pub fn with_min_train_weeks(mut self, weeks: usize) -> Self {
        self.min_train_weeks = weeks;
        self
    }

    /// Set the validation horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the step between cutoffs.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_train_weeks == 0 {
            return Err(ForecastError::InvalidParameter(
                "training window must hold at least 1 week".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "validation horizon must be at least 1".to_string(),
            ));
        }
        if self.step == 0 {
            return Err(ForecastError::InvalidParameter(
                "fold step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Folds produced for a clean timeline of `n_weeks` weeks.
    pub fn n_folds(&self, n_weeks: usize) -> usize {
        let needed = self.min_train_weeks + self.horizon;
        if self.step == 0 || n_weeks < needed {
            return 0;
        }
        (n_weeks - needed) / self.step + 1
    }
}

/// One train/validation split.
///
/// Both sides hold every panel row (all series, all fields) whose week start
/// falls in the respective window. Every training week precedes every
/// validation week.
#[derive(Debug, Clone)]
pub struct Fold<'a> {
    /// Zero-based fold number.
    pub index: usize,
    pub train: PanelSlice<'a>,
    pub validation: PanelSlice<'a>,
    /// Last week of the training window.
    pub train_end: NaiveDate,
    pub validation_start: NaiveDate,
    pub validation_end: NaiveDate,
}

/// Produces expanding-window folds over the clean weekly timeline of a panel.
///
/// # Example
///
/// ```
/// use demand_hybrid::core::{HistoryPanel, SeriesKey};
/// use demand_hybrid::validation::{RollingOriginConfig, RollingOriginValidator};
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
/// let panel = HistoryPanel::builder()
///     .weekly_series(SeriesKey::new("1", "DAIRY"), monday, &[3.0; 64])
///     .build()
///     .unwrap();
///
/// let validator = RollingOriginValidator::new(RollingOriginConfig::default()).unwrap();
/// let folds = validator.folds(&panel).unwrap();
/// assert_eq!(folds.n_folds(), 2);
/// assert_eq!(folds.count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollingOriginValidator {
    config: RollingOriginConfig,
}

impl RollingOriginValidator {
    /// Create a validator. Zero-sized windows and a zero step are rejected.
    pub fn new(config: RollingOriginConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RollingOriginConfig {
        &self.config
    }

    /// Lay out the folds of `panel`.
    ///
    /// Fails with [`ForecastError::InsufficientData`] when the clean timeline
    /// is shorter than `min_train_weeks + horizon`; no fold is produced then.
    pub fn folds<'a>(&self, panel: &'a HistoryPanel) -> Result<RollingFolds<'a>> {
        self.config.validate()?;
        let timeline = panel.clean_timeline();
        let needed = self.config.min_train_weeks + self.config.horizon;
        if timeline.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: timeline.len(),
            });
        }
        Ok(RollingFolds {
            panel,
            timeline,
            config: self.config,
            next: 0,
        })
    }
}

/// Lazy iterator over the folds of one panel.
///
/// Slices are only built when a fold is pulled. Cloning the iterator, or
/// calling [`restart`](Self::restart), replays the folds from the start.
#[derive(Debug, Clone)]
pub struct RollingFolds<'a> {
    panel: &'a HistoryPanel,
    timeline: Vec<NaiveDate>,
    config: RollingOriginConfig,
    next: usize,
}

impl<'a> RollingFolds<'a> {
    /// Total number of folds, pulled or not.
    pub fn n_folds(&self) -> usize {
        self.config.n_folds(self.timeline.len())
    }

    /// Clean weeks the folds are cut from.
    pub fn timeline(&self) -> &[NaiveDate] {
        &self.timeline
    }

    /// Rewind to the first fold.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    fn fold_at(&self, index: usize) -> Option<Fold<'a>> {
        if index >= self.n_folds() {
            return None;
        }
        let cutoff = self.config.min_train_weeks + index * self.config.step;
        let train_weeks = &self.timeline[..cutoff];
        let validation_weeks = &self.timeline[cutoff..cutoff + self.config.horizon];

        let train_end = *train_weeks.last()?;
        let validation_start = *validation_weeks.first()?;
        let validation_end = *validation_weeks.last()?;

        let train = self.window(train_weeks);
        let validation = self.window(validation_weeks);

        log::info!(
            "fold {}: train end={} | validation=[{} - {}] ({} train rows, {} validation rows)",
            index + 1,
            train_end,
            validation_start,
            validation_end,
            train.len(),
            validation.len()
        );

        Some(Fold {
            index,
            train,
            validation,
            train_end,
            validation_start,
            validation_end,
        })
    }

    fn window(&self, weeks: &[NaiveDate]) -> PanelSlice<'a> {
        let weeks: BTreeSet<NaiveDate> = weeks.iter().copied().collect();
        self.panel.slice(self.panel.rows_in_weeks(&weeks))
    }
}

impl<'a> Iterator for RollingFolds<'a> {
    type Item = Fold<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let fold = self.fold_at(self.next)?;
        self.next += 1;
        Some(fold)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_folds().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingFolds<'_> {}

//! Weekly history panel: many (location, category) demand series in one structure.

use crate::core::table::{Column, Table};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

/// Identifies one demand series: a location and a product category.
///
/// Keys order by location first, then category, which fixes the row order of
/// every panel-wide output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    location: String,
    category: String,
}

impl SeriesKey {
    pub fn new(location: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            category: category.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.category)
    }
}

/// One week of demand for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub key: SeriesKey,
    /// Monday the week starts on.
    pub week_start: NaiveDate,
    /// Demand quantity. NaN marks a missing week.
    pub demand: f64,
    /// Whether the week is a complete, uncontaminated week of history.
    pub is_clean_history: bool,
    /// Any further numeric fields supplied upstream (promotions, prices, ...).
    pub auxiliary: BTreeMap<String, f64>,
}

impl Observation {
    /// Create a clean observation without auxiliary fields.
    pub fn new(key: SeriesKey, week_start: NaiveDate, demand: f64) -> Self {
        Self {
            key,
            week_start,
            demand,
            is_clean_history: true,
            auxiliary: BTreeMap::new(),
        }
    }

    /// Set the clean-history flag.
    pub fn with_clean_history(mut self, clean: bool) -> Self {
        self.is_clean_history = clean;
        self
    }

    /// Attach an auxiliary numeric field.
    pub fn with_auxiliary(mut self, name: impl Into<String>, value: f64) -> Self {
        self.auxiliary.insert(name.into(), value);
        self
    }
}

/// Column names used when reading a panel out of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSchema {
    pub location: String,
    pub category: String,
    pub week_start: String,
    pub demand: String,
    /// Optional; when the table lacks it every row is treated as clean.
    pub clean_flag: String,
}

impl Default for PanelSchema {
    fn default() -> Self {
        Self {
            location: "location".to_string(),
            category: "category".to_string(),
            week_start: "week_start".to_string(),
            demand: "demand".to_string(),
            clean_flag: "is_clean_history".to_string(),
        }
    }
}

impl PanelSchema {
    /// Set the name of the demand column (e.g. `sales`).
    pub fn with_demand_column(mut self, name: impl Into<String>) -> Self {
        self.demand = name.into();
        self
    }

    /// Set the names of the two key columns.
    pub fn with_key_columns(
        mut self,
        location: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        self.location = location.into();
        self.category = category.into();
        self
    }

    /// Set the name of the week-start column.
    pub fn with_week_column(mut self, name: impl Into<String>) -> Self {
        self.week_start = name.into();
        self
    }

    /// Set the name of the clean-history flag column.
    pub fn with_clean_flag_column(mut self, name: impl Into<String>) -> Self {
        self.clean_flag = name.into();
        self
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == self.location
            || name == self.category
            || name == self.week_start
            || name == self.demand
            || name == self.clean_flag
    }
}

/// Sorted, validated collection of weekly observations across all series.
///
/// Observations are stored ordered by series key, then week start, so each
/// series occupies one contiguous run of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPanel {
    observations: Vec<Observation>,
    series: BTreeMap<SeriesKey, Range<usize>>,
}

impl HistoryPanel {
    /// Build a panel from unordered observations.
    ///
    /// Fails on negative demand, non-Monday week starts and duplicated
    /// (series, week) pairs. NaN demand is kept as a missing week.
    pub fn from_observations(mut observations: Vec<Observation>) -> Result<Self> {
        for obs in &observations {
            validate_observation(obs)?;
        }
        observations.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| a.week_start.cmp(&b.week_start))
        });
        if let Some(pair) = observations
            .windows(2)
            .find(|w| w[0].key == w[1].key && w[0].week_start == w[1].week_start)
        {
            return Err(ForecastError::DuplicateObservation {
                key: pair[1].key.to_string(),
                week_start: pair[1].week_start,
            });
        }
        Ok(Self::from_sorted(observations))
    }

    /// Read a panel out of a column-oriented table.
    ///
    /// # Example
    ///
    /// ```
    /// use demand_hybrid::core::{Column, HistoryPanel, PanelSchema, Table};
    /// use demand_hybrid::ForecastError;
    /// use chrono::NaiveDate;
    ///
    /// let week = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
    /// let table = Table::new()
    ///     .with_column("location", Column::Text(vec!["1".into()])).unwrap()
    ///     .with_column("category", Column::Text(vec!["BREAD".into()])).unwrap()
    ///     .with_column("week_start", Column::Date(vec![week])).unwrap();
    ///
    /// let err = HistoryPanel::from_table(&table, &PanelSchema::default()).unwrap_err();
    /// assert_eq!(err, ForecastError::MissingColumn("demand".into()));
    /// ```
    pub fn from_table(table: &Table, schema: &PanelSchema) -> Result<Self> {
        let locations = table.text(&schema.location)?;
        let categories = table.text(&schema.category)?;
        let weeks = table.dates(&schema.week_start)?;
        let demand = table.numbers(&schema.demand)?;
        let clean = if table.has_column(&schema.clean_flag) {
            Some(table.flags(&schema.clean_flag)?)
        } else {
            None
        };

        let auxiliary: Vec<(&str, &[f64])> = table
            .columns()
            .filter(|(name, _)| !schema.is_reserved(name))
            .filter_map(|(name, column)| match column {
                Column::Number(values) => Some((name, values.as_slice())),
                _ => None,
            })
            .collect();

        let observations = (0..table.n_rows())
            .map(|i| {
                let mut obs = Observation::new(
                    SeriesKey::new(locations[i].clone(), categories[i].clone()),
                    weeks[i],
                    demand[i],
                );
                if let Some(flags) = clean {
                    obs.is_clean_history = flags[i];
                }
                for (name, values) in &auxiliary {
                    obs.auxiliary.insert((*name).to_string(), values[i]);
                }
                obs
            })
            .collect();

        Self::from_observations(observations)
    }

    /// Create a builder that accepts observations one at a time.
    pub fn builder() -> PanelBuilder {
        PanelBuilder::new()
    }

    /// Observations already sorted by (key, week) and free of duplicates.
    fn from_sorted(observations: Vec<Observation>) -> Self {
        let mut series: BTreeMap<SeriesKey, Range<usize>> = BTreeMap::new();
        let mut start = 0;
        for i in 1..=observations.len() {
            if i == observations.len() || observations[i].key != observations[start].key {
                series.insert(observations[start].key.clone(), start..i);
                start = i;
            }
        }
        Self {
            observations,
            series,
        }
    }

    /// Total number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of distinct series.
    pub fn n_series(&self) -> usize {
        self.series.len()
    }

    /// All observations in (key, week) order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Series keys in ascending order.
    pub fn series_keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.series.keys()
    }

    /// Chronologically ordered observations of one series.
    pub fn series(&self, key: &SeriesKey) -> Option<&[Observation]> {
        self.series
            .get(key)
            .map(|range| &self.observations[range.clone()])
    }

    /// Iterate over every series with its observations.
    pub fn iter_series(&self) -> impl Iterator<Item = (&SeriesKey, &[Observation])> {
        self.series
            .iter()
            .map(|(key, range)| (key, &self.observations[range.clone()]))
    }

    /// Latest week present for a series.
    pub fn last_week(&self, key: &SeriesKey) -> Option<NaiveDate> {
        self.series(key)
            .and_then(|obs| obs.last())
            .map(|o| o.week_start)
    }

    /// Distinct week starts of clean observations, ascending.
    pub fn clean_timeline(&self) -> Vec<NaiveDate> {
        self.observations
            .iter()
            .filter(|o| o.is_clean_history)
            .map(|o| o.week_start)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Row indices whose week start lies in `weeks`.
    pub(crate) fn rows_in_weeks(&self, weeks: &BTreeSet<NaiveDate>) -> Vec<usize> {
        self.observations
            .iter()
            .enumerate()
            .filter(|(_, o)| weeks.contains(&o.week_start))
            .map(|(i, _)| i)
            .collect()
    }

    /// Borrow a subset of rows as a read-only view.
    pub(crate) fn slice(&self, rows: Vec<usize>) -> PanelSlice<'_> {
        PanelSlice { panel: self, rows }
    }
}

/// Finite demand values of one series, oldest first. Missing weeks are skipped.
pub fn demand_sequence(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .map(|o| o.demand)
        .filter(|d| d.is_finite())
        .collect()
}

fn validate_observation(obs: &Observation) -> Result<()> {
    if obs.demand < 0.0 {
        return Err(ForecastError::NegativeDemand {
            key: obs.key.to_string(),
            week_start: obs.week_start,
            value: obs.demand,
        });
    }
    if obs.week_start.weekday() != Weekday::Mon {
        return Err(ForecastError::TimestampError(format!(
            "week start {} of {} is a {:?}, expected Monday",
            obs.week_start,
            obs.key,
            obs.week_start.weekday()
        )));
    }
    Ok(())
}

/// Builder for [`HistoryPanel`].
#[derive(Debug, Clone, Default)]
pub struct PanelBuilder {
    observations: Vec<Observation>,
}

impl PanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn observation(mut self, observation: Observation) -> Self {
        self.observations.push(observation);
        self
    }

    /// Add a whole series of consecutive weeks starting at `first_week`.
    pub fn weekly_series(mut self, key: SeriesKey, first_week: NaiveDate, demand: &[f64]) -> Self {
        self.observations
            .extend(demand.iter().enumerate().map(|(i, &d)| {
                Observation::new(key.clone(), first_week + chrono::Duration::weeks(i as i64), d)
            }));
        self
    }

    pub fn build(self) -> Result<HistoryPanel> {
        HistoryPanel::from_observations(self.observations)
    }
}

/// Read-only view over selected rows of a panel.
#[derive(Debug, Clone)]
pub struct PanelSlice<'a> {
    panel: &'a HistoryPanel,
    rows: Vec<usize>,
}

impl<'a> PanelSlice<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the selected observations in panel order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        let panel = self.panel;
        self.rows.iter().map(move |&i| &panel.observations[i])
    }

    /// Distinct week starts covered by the view, ascending.
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        self.iter()
            .map(|o| o.week_start)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest week in the view.
    pub fn week_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let weeks = self.week_starts();
        Some((*weeks.first()?, *weeks.last()?))
    }

    /// Copy the selected rows into an owned panel.
    pub fn to_panel(&self) -> HistoryPanel {
        // Rows are ascending indices into a sorted panel.
        HistoryPanel::from_sorted(self.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, 2).unwrap() + chrono::Duration::weeks(i)
    }

    fn key(loc: &str, cat: &str) -> SeriesKey {
        SeriesKey::new(loc, cat)
    }

    #[test]
    fn panel_sorts_by_key_then_week() {
        let panel = HistoryPanel::from_observations(vec![
            Observation::new(key("2", "BREAD"), monday(1), 4.0),
            Observation::new(key("1", "MILK"), monday(1), 2.0),
            Observation::new(key("1", "MILK"), monday(0), 1.0),
            Observation::new(key("2", "BREAD"), monday(0), 3.0),
        ])
        .unwrap();

        let keys: Vec<_> = panel.series_keys().cloned().collect();
        assert_eq!(keys, vec![key("1", "MILK"), key("2", "BREAD")]);

        let milk = panel.series(&key("1", "MILK")).unwrap();
        assert_eq!(demand_sequence(milk), vec![1.0, 2.0]);
        assert_eq!(panel.last_week(&key("2", "BREAD")), Some(monday(1)));
        assert_eq!(panel.n_series(), 2);
        assert_eq!(panel.len(), 4);

        let demand: Vec<f64> = panel.observations().iter().map(|o| o.demand).collect();
        assert_eq!(demand, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn panel_rejects_duplicates() {
        let result = HistoryPanel::from_observations(vec![
            Observation::new(key("1", "MILK"), monday(0), 1.0),
            Observation::new(key("1", "MILK"), monday(0), 2.0),
        ]);
        assert!(matches!(
            result,
            Err(ForecastError::DuplicateObservation { .. })
        ));
    }

    #[test]
    fn panel_rejects_negative_demand() {
        let result = HistoryPanel::builder()
            .observation(Observation::new(key("1", "MILK"), monday(0), -1.0))
            .build();
        assert!(matches!(result, Err(ForecastError::NegativeDemand { .. })));
    }

    #[test]
    fn panel_rejects_non_monday_weeks() {
        let tuesday = monday(0) + chrono::Duration::days(1);
        let result = HistoryPanel::builder()
            .observation(Observation::new(key("1", "MILK"), tuesday, 1.0))
            .build();
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn missing_weeks_are_skipped_in_demand_sequence() {
        let panel = HistoryPanel::builder()
            .weekly_series(key("1", "MILK"), monday(0), &[1.0, f64::NAN, 3.0])
            .build()
            .unwrap();
        let obs = panel.series(&key("1", "MILK")).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(demand_sequence(obs), vec![1.0, 3.0]);
    }

    #[test]
    fn clean_timeline_excludes_flagged_weeks() {
        let panel = HistoryPanel::from_observations(vec![
            Observation::new(key("1", "MILK"), monday(0), 1.0),
            Observation::new(key("2", "MILK"), monday(0), 1.0),
            Observation::new(key("1", "MILK"), monday(1), 1.0),
            Observation::new(key("1", "MILK"), monday(2), 1.0).with_clean_history(false),
        ])
        .unwrap();
        assert_eq!(panel.clean_timeline(), vec![monday(0), monday(1)]);
    }

    #[test]
    fn from_table_reads_schema_and_auxiliary_columns() {
        let table = Table::new()
            .with_column("store_nbr", Column::Text(vec!["1".into(), "1".into()]))
            .unwrap()
            .with_column("family", Column::Text(vec!["EGGS".into(), "EGGS".into()]))
            .unwrap()
            .with_column("week_start", Column::Date(vec![monday(1), monday(0)]))
            .unwrap()
            .with_column("sales", Column::Number(vec![7.0, 5.0]))
            .unwrap()
            .with_column("onpromotion", Column::Number(vec![1.0, 0.0]))
            .unwrap()
            .with_column("is_clean_history", Column::Flag(vec![false, true]))
            .unwrap();
        let schema = PanelSchema::default()
            .with_key_columns("store_nbr", "family")
            .with_demand_column("sales");

        let panel = HistoryPanel::from_table(&table, &schema).unwrap();
        let obs = panel.series(&key("1", "EGGS")).unwrap();

        assert_eq!(obs[0].week_start, monday(0));
        assert_eq!(obs[0].demand, 5.0);
        assert!(obs[0].is_clean_history);
        assert!(!obs[1].is_clean_history);
        assert_eq!(obs[1].auxiliary.get("onpromotion"), Some(&1.0));
        assert!(!obs[1].auxiliary.contains_key("sales"));
    }

    #[test]
    fn from_table_requires_demand_column() {
        let table = Table::new()
            .with_column("location", Column::Text(vec!["1".into()]))
            .unwrap()
            .with_column("category", Column::Text(vec!["EGGS".into()]))
            .unwrap()
            .with_column("week_start", Column::Date(vec![monday(0)]))
            .unwrap()
            .with_column("sales", Column::Number(vec![1.0]))
            .unwrap();

        let err = HistoryPanel::from_table(&table, &PanelSchema::default()).unwrap_err();
        assert_eq!(err, ForecastError::MissingColumn("demand".to_string()));
    }

    #[test]
    fn slice_materialises_sorted_panel() {
        let panel = HistoryPanel::builder()
            .weekly_series(key("1", "MILK"), monday(0), &[1.0, 2.0, 3.0])
            .weekly_series(key("2", "MILK"), monday(0), &[4.0, 5.0, 6.0])
            .build()
            .unwrap();
        let weeks: BTreeSet<_> = [monday(1), monday(2)].into_iter().collect();
        let slice = panel.slice(panel.rows_in_weeks(&weeks));

        assert_eq!(slice.len(), 4);
        assert_eq!(slice.week_range(), Some((monday(1), monday(2))));

        let owned = slice.to_panel();
        assert_eq!(owned.n_series(), 2);
        assert_eq!(
            demand_sequence(owned.series(&key("2", "MILK")).unwrap()),
            vec![5.0, 6.0]
        );
    }

    #[test]
    fn series_key_display() {
        assert_eq!(key("44", "PRODUCE").to_string(), "44/PRODUCE");
    }
}

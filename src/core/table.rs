//! Column-oriented table handed over by the data-preparation stage.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A single named column of homogeneous values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Identifiers and labels.
    Text(Vec<String>),
    /// Calendar dates.
    Date(Vec<NaiveDate>),
    /// Numeric measures (may contain NaN for missing values).
    Number(Vec<f64>),
    /// Boolean flags.
    Flag(Vec<bool>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Number(v) => v.len(),
            Column::Flag(v) => v.len(),
        }
    }

    /// Check if the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable name of the value kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Text(_) => "text",
            Column::Date(_) => "date",
            Column::Number(_) => "number",
            Column::Flag(_) => "flag",
        }
    }
}

/// A table of equally long named columns.
///
/// # Example
///
/// ```
/// use demand_hybrid::core::{Column, Table};
/// use chrono::NaiveDate;
///
/// let week = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
/// let table = Table::new()
///     .with_column("location", Column::Text(vec!["1".into()]))
///     .unwrap()
///     .with_column("week_start", Column::Date(vec![week]))
///     .unwrap();
///
/// assert_eq!(table.n_rows(), 1);
/// assert!(table.has_column("location"));
/// assert!(!table.has_column("demand"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: BTreeMap<String, Column>,
    n_rows: Option<usize>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, consuming and returning the table.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Add or replace a column. All columns must have the same length.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        match self.n_rows {
            Some(expected) if !replacing_only && column.len() != expected => {
                return Err(ForecastError::DimensionMismatch {
                    expected,
                    got: column.len(),
                });
            }
            _ => self.n_rows = Some(column.len()),
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Number of rows (zero for a table without columns).
    pub fn n_rows(&self) -> usize {
        self.n_rows.unwrap_or(0)
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Names of all columns in lexical order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Iterate over `(name, column)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Get a required text column.
    pub fn text(&self, name: &str) -> Result<&[String]> {
        match self.require(name)? {
            Column::Text(v) => Ok(v),
            _ => Err(type_error(name, "text")),
        }
    }

    /// Get a required date column.
    pub fn dates(&self, name: &str) -> Result<&[NaiveDate]> {
        match self.require(name)? {
            Column::Date(v) => Ok(v),
            _ => Err(type_error(name, "date")),
        }
    }

    /// Get a required numeric column.
    pub fn numbers(&self, name: &str) -> Result<&[f64]> {
        match self.require(name)? {
            Column::Number(v) => Ok(v),
            _ => Err(type_error(name, "number")),
        }
    }

    /// Get a required flag column.
    ///
    /// Numeric columns holding only 0 and 1 are not accepted; convert them upstream.
    pub fn flags(&self, name: &str) -> Result<&[bool]> {
        match self.require(name)? {
            Column::Flag(v) => Ok(v),
            _ => Err(type_error(name, "flag")),
        }
    }
}

fn type_error(column: &str, expected: &'static str) -> ForecastError {
    ForecastError::ColumnType {
        column: column.to_string(),
        expected,
    }
}

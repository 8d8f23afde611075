//! Core data structures: input tables, the weekly history panel and forecasts.

mod forecast;
mod panel;
mod table;

pub use forecast::{future_weeks, Forecast, PanelForecast, SeriesForecast};
pub use panel::{
    demand_sequence, HistoryPanel, Observation, PanelBuilder, PanelSchema, PanelSlice, SeriesKey,
};
pub use table::{Column, Table};

//! Baseline forecasting models.
//!
//! Simple single-strategy forecasters. The hybrid engine blends two of them;
//! each is also usable on its own as a benchmark.

mod moving_average;
mod seasonal_lookback;

pub use moving_average::{trailing_mean, MovingAverage, DEFAULT_WINDOW};
pub use seasonal_lookback::{seasonal_lookback, SeasonalLookback, DEFAULT_SEASON_LENGTH};

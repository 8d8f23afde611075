//! Demand pattern → blend weight strategy table.

use crate::core::Forecast;
use crate::error::{ForecastError, Result};
use crate::features::DemandPattern;

/// Convex weights over the seasonal-lookback and moving-average forecasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub seasonal: f64,
    pub moving_average: f64,
}

impl BlendWeights {
    /// Moving average alone.
    pub const MOVING_AVERAGE_ONLY: BlendWeights = BlendWeights {
        seasonal: 0.0,
        moving_average: 1.0,
    };

    /// Create weights; both must be non-negative and sum to one.
    pub fn new(seasonal: f64, moving_average: f64) -> Result<Self> {
        if !(seasonal >= 0.0 && moving_average >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "blend weights must be non-negative, got ({seasonal}, {moving_average})"
            )));
        }
        if ((seasonal + moving_average) - 1.0).abs() > 1e-9 {
            return Err(ForecastError::InvalidParameter(format!(
                "blend weights must sum to 1, got {}",
                seasonal + moving_average
            )));
        }
        Ok(Self {
            seasonal,
            moving_average,
        })
    }

    /// Combine the two baseline trajectories.
    pub fn apply(&self, seasonal: &Forecast, moving_average: &Forecast) -> Result<Forecast> {
        seasonal.blend(self.seasonal, moving_average, self.moving_average)
    }
}

/// Blend weights for every demand pattern.
///
/// The default table is:
///
/// | pattern      | seasonal | moving average |
/// |--------------|----------|----------------|
/// | smooth       | 0.3      | 0.7            |
/// | erratic      | 0.5      | 0.5            |
/// | intermittent | 0.0      | 1.0            |
/// | lumpy        | 0.0      | 1.0            |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendPolicy {
    smooth: BlendWeights,
    erratic: BlendWeights,
    intermittent: BlendWeights,
    lumpy: BlendWeights,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            smooth: BlendWeights {
                seasonal: 0.3,
                moving_average: 0.7,
            },
            erratic: BlendWeights {
                seasonal: 0.5,
                moving_average: 0.5,
            },
            intermittent: BlendWeights::MOVING_AVERAGE_ONLY,
            lumpy: BlendWeights::MOVING_AVERAGE_ONLY,
        }
    }
}

impl BlendPolicy {
    /// Weights used for a pattern.
    pub fn weights(&self, pattern: DemandPattern) -> BlendWeights {
        match pattern {
            DemandPattern::Smooth => self.smooth,
            DemandPattern::Erratic => self.erratic,
            DemandPattern::Intermittent => self.intermittent,
            DemandPattern::Lumpy => self.lumpy,
        }
    }

    /// Override the weights of one pattern.
    pub fn with_weights(mut self, pattern: DemandPattern, weights: BlendWeights) -> Self {
        let slot = match pattern {
            DemandPattern::Smooth => &mut self.smooth,
            DemandPattern::Erratic => &mut self.erratic,
            DemandPattern::Intermittent => &mut self.intermittent,
            DemandPattern::Lumpy => &mut self.lumpy,
        };
        *slot = weights;
        self
    }
}

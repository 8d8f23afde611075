//! Configuration of the hybrid engine.

use super::blend::{BlendPolicy, BlendWeights};
use crate::features::{ClassifierThresholds, DemandPattern};
use crate::models::baseline::{DEFAULT_SEASON_LENGTH, DEFAULT_WINDOW};

/// Tunable constants of the hybrid engine.
///
/// # Example
///
/// ```
/// use demand_hybrid::models::HybridConfig;
///
/// let config = HybridConfig::default().with_season_length(13).with_ma_window(8);
/// assert_eq!(config.season_length, 13);
/// assert_eq!(config.ma_window, 8);
/// assert_eq!(config.thresholds.adi, 1.32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridConfig {
    /// Trailing weeks averaged by the moving-average component (0 = all).
    pub ma_window: usize,
    /// Lookback distance of the seasonal component.
    pub season_length: usize,
    /// ADI / CV² quadrant boundaries.
    pub thresholds: ClassifierThresholds,
    /// Pattern → blend weight table.
    pub blend: BlendPolicy,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            ma_window: DEFAULT_WINDOW,
            season_length: DEFAULT_SEASON_LENGTH,
            thresholds: ClassifierThresholds::default(),
            blend: BlendPolicy::default(),
        }
    }
}

impl HybridConfig {
    /// Set the moving-average window.
    pub fn with_ma_window(mut self, window: usize) -> Self {
        self.ma_window = window;
        self
    }

    /// Set the seasonal lookback distance.
    pub fn with_season_length(mut self, season_length: usize) -> Self {
        self.season_length = season_length;
        self
    }

    /// Set the classification thresholds.
    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the blend table.
    pub fn with_blend_policy(mut self, blend: BlendPolicy) -> Self {
        self.blend = blend;
        self
    }

    /// Override the blend weights of one pattern.
    pub fn with_pattern_weights(mut self, pattern: DemandPattern, weights: BlendWeights) -> Self {
        self.blend = self.blend.with_weights(pattern, weights);
        self
    }
}

//! Demand-pattern classification from the ADI / CV² quadrant.
//!
//! A series is placed in one of four quadrants by two statistics:
//! - ADI, the average number of periods per non-zero demand
//! - CV², the squared coefficient of variation of the non-zero demand sizes
//!
//! ```text
//!               CV² < 0.49      CV² >= 0.49
//! ADI <  1.32   smooth          erratic
//! ADI >= 1.32   intermittent    lumpy
//! ```

use crate::error::ForecastError;
use std::fmt;
use std::str::FromStr;

/// Default ADI cut-off between regular and sparse demand.
pub const ADI_THRESHOLD: f64 = 1.32;

/// Default CV² cut-off between stable and variable demand sizes.
pub const CV2_THRESHOLD: f64 = 0.49;

/// Demand regularity class of a single series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DemandPattern {
    Smooth,
    Erratic,
    Intermittent,
    Lumpy,
}

impl DemandPattern {
    /// All patterns in quadrant order.
    pub const ALL: [DemandPattern; 4] = [
        DemandPattern::Smooth,
        DemandPattern::Erratic,
        DemandPattern::Intermittent,
        DemandPattern::Lumpy,
    ];

    /// Place an (ADI, CV²) pair in its quadrant.
    pub fn from_statistics(adi: f64, cv2: f64, thresholds: &ClassifierThresholds) -> Self {
        let sparse = adi >= thresholds.adi;
        let variable = cv2 >= thresholds.cv2;
        match (sparse, variable) {
            (false, false) => DemandPattern::Smooth,
            (false, true) => DemandPattern::Erratic,
            (true, false) => DemandPattern::Intermittent,
            (true, true) => DemandPattern::Lumpy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandPattern::Smooth => "smooth",
            DemandPattern::Erratic => "erratic",
            DemandPattern::Intermittent => "intermittent",
            DemandPattern::Lumpy => "lumpy",
        }
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandPattern {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smooth" => Ok(DemandPattern::Smooth),
            "erratic" => Ok(DemandPattern::Erratic),
            "intermittent" => Ok(DemandPattern::Intermittent),
            "lumpy" => Ok(DemandPattern::Lumpy),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown demand pattern `{other}`"
            ))),
        }
    }
}

/// Quadrant boundaries used by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    pub adi: f64,
    pub cv2: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            adi: ADI_THRESHOLD,
            cv2: CV2_THRESHOLD,
        }
    }
}

impl ClassifierThresholds {
    pub fn new(adi: f64, cv2: f64) -> Self {
        Self { adi, cv2 }
    }
}

/// Result of classifying one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub pattern: DemandPattern,
    /// Average demand interval; zero when the series has no demand.
    pub adi: f64,
    /// Squared coefficient of variation of non-zero sizes; zero when undefined.
    pub cv2: f64,
    /// Number of finite observations.
    pub n_observations: usize,
    /// Number of strictly positive observations.
    pub n_nonzero: usize,
}

impl Classification {
    fn degenerate(n_observations: usize, n_nonzero: usize, adi: f64) -> Self {
        Self {
            pattern: DemandPattern::Intermittent,
            adi,
            cv2: 0.0,
            n_observations,
            n_nonzero,
        }
    }
}

/// Classify a series' demand regularity.
///
/// Non-finite values are dropped first. ADI is the total number of periods
/// divided by the number of non-zero periods; CV² is the population variance of
/// the non-zero values over their squared mean. Series without positive demand
/// are labelled intermittent.
///
/// # Example
///
/// ```
/// use demand_hybrid::features::{classify, ClassifierThresholds, DemandPattern};
///
/// let c = classify(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 6.0], &ClassifierThresholds::default());
/// assert_eq!(c.pattern, DemandPattern::Intermittent);
/// assert_eq!(c.adi, 4.0);
/// ```
pub fn classify(values: &[f64], thresholds: &ClassifierThresholds) -> Classification {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    let positive: Vec<f64> = finite.iter().copied().filter(|&v| v > 0.0).collect();
    let nz = positive.len();

    if nz == 0 {
        return Classification::degenerate(n, 0, 0.0);
    }

    let adi = n as f64 / nz as f64;
    let mean = positive.iter().sum::<f64>() / nz as f64;
    if mean == 0.0 {
        return Classification::degenerate(n, nz, adi);
    }
    let variance = positive.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nz as f64;
    let cv2 = variance / (mean * mean);

    Classification {
        pattern: DemandPattern::from_statistics(adi, cv2, thresholds),
        adi,
        cv2,
        n_observations: n,
        n_nonzero: nz,
    }
}

//! Accuracy metrics for forecast evaluation.
//!
//! Volume-weighted measures (WAPE, bias) are the headline numbers for demand
//! panels because they stay defined when individual weeks have zero demand.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Number of (actual, predicted) pairs scored.
    pub n: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Weighted Absolute Percentage Error, `Σ|a - p| / Σ|a|` (None if total actual is zero)
    pub wape: Option<f64>,
    /// Signed bias, `Σ(p - a) / Σ|a|` (None if total actual is zero)
    pub bias: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Example
///
/// ```
/// use demand_hybrid::utils::calculate_metrics;
///
/// let m = calculate_metrics(&[10.0, 0.0, 10.0], &[8.0, 1.0, 12.0]).unwrap();
/// assert_eq!(m.wape, Some(0.25));
/// assert_eq!(m.bias, Some(0.05));
/// ```
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    Ok(AccuracyMetrics {
        n: actual.len(),
        mae: mae(actual, predicted),
        rmse: rmse(actual, predicted),
        wape: wape(actual, predicted),
        bias: bias(actual, predicted),
        smape: smape(actual, predicted),
    })
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    absolute_error(actual, predicted) / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Weighted absolute percentage error.
pub fn wape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let volume = total_volume(actual, predicted)?;
    Some(absolute_error(actual, predicted) / volume)
}

/// Total over- (positive) or under- (negative) forecast relative to volume.
pub fn bias(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let volume = total_volume(actual, predicted)?;
    let signed: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| p - a)
        .sum();
    Some(signed / volume)
}

/// Calculate SMAPE between two slices.
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n
}

fn absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum()
}

/// `Σ|a|`, or `None` when it is zero or the slices do not pair up.
fn total_volume(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return None;
    }
    let volume: f64 = actual.iter().map(|a| a.abs()).sum();
    (volume > 0.0).then_some(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calculate_metrics_perfect_prediction() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let metrics = calculate_metrics(&actual, &predicted).unwrap();

        assert_eq!(metrics.n, 5);
        assert_relative_eq!(metrics.mae, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.rmse, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.smape, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.wape.unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.bias.unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn calculate_metrics_known_values() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.5, 2.5, 2.5, 4.5, 4.5];
        // Errors: 0.5, 0.5, -0.5, 0.5, -0.5

        let metrics = calculate_metrics(&actual, &predicted).unwrap();

        assert_relative_eq!(metrics.mae, 0.5, epsilon = 1e-10);
        assert_relative_eq!(metrics.rmse, 0.5, epsilon = 1e-10);
        assert_relative_eq!(metrics.wape.unwrap(), 2.5 / 15.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.bias.unwrap(), 0.5 / 15.0, epsilon = 1e-10);
    }

    #[test]
    fn wape_and_bias_undefined_without_volume() {
        let metrics = calculate_metrics(&[0.0, 0.0], &[1.0, 0.0]).unwrap();
        assert!(metrics.wape.is_none());
        assert!(metrics.bias.is_none());
        assert_relative_eq!(metrics.mae, 0.5);
        assert!(metrics.smape.is_finite());
    }

    #[test]
    fn bias_sign_follows_over_forecasting() {
        assert!(bias(&[10.0, 10.0], &[12.0, 11.0]).unwrap() > 0.0);
        assert!(bias(&[10.0, 10.0], &[8.0, 9.0]).unwrap() < 0.0);
    }

    #[test]
    fn calculate_metrics_dimension_mismatch() {
        let result = calculate_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn calculate_metrics_empty_data() {
        let result = calculate_metrics(&[], &[]);
        assert!(matches!(result, Err(ForecastError::EmptyData)));
    }

    #[test]
    fn standalone_metrics() {
        assert_relative_eq!(mae(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]), 0.5, epsilon = 1e-10);
        assert_relative_eq!(rmse(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]), 1.0, epsilon = 1e-10);
        assert_relative_eq!(smape(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0, epsilon = 1e-10);
        assert!(mae(&[1.0], &[]).is_nan());
        assert!(wape(&[1.0], &[]).is_none());
    }
}

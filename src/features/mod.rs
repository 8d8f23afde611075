//! Per-series features used to choose a forecasting strategy.
//!
//! # Example
//!
//! ```
//! use demand_hybrid::features::{classify, ClassifierThresholds, DemandPattern};
//!
//! let series = vec![10.0; 60];
//! let c = classify(&series, &ClassifierThresholds::default());
//! assert_eq!(c.pattern, DemandPattern::Smooth);
//! assert_eq!(c.adi, 1.0);
//! ```

pub mod demand_pattern;

pub use demand_pattern::{
    classify, Classification, ClassifierThresholds, DemandPattern, ADI_THRESHOLD, CV2_THRESHOLD,
};

//! Intermittent demand forecasting models.
//!
//! Models for demand that is sporadic, with many zero-demand weeks
//! interspersed with occasional non-zero demands.

mod croston;

pub use croston::{croston_state, Croston, CrostonState, CrostonVariant, DEFAULT_ALPHA};

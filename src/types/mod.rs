//! Type definitions for the obesity level predictor

pub mod input;
pub mod prediction;

pub use input::{FormInput, RawInput};
pub use prediction::PredictionReport;

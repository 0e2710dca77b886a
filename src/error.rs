//! Error types surfaced to callers of the prediction pipeline

use thiserror::Error;

/// Rejected submission, reported back to the user
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid value {value:?} for {field}")]
    InvalidCategory { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must move in steps of {step} from its minimum, got {value}")]
    OffStep {
        field: &'static str,
        value: f64,
        step: f64,
    },

    #[error("malformed submission: {0}")]
    Malformed(String),
}

/// Failure while scaling or classifying an encoded row
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("feature row has {actual} columns, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model predicted class {0} which has no label")]
    UnknownClass(i64),

    #[error("model {model} failed: {message}")]
    Model { model: String, message: String },
}

impl PredictError {
    pub fn model(model: &str, err: impl std::fmt::Display) -> Self {
        PredictError::Model {
            model: model.to_string(),
            message: err.to_string(),
        }
    }
}

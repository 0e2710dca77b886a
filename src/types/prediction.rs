//! Prediction report returned to the user

use crate::encoder::FeatureRow;
use crate::types::input::RawInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one submission, including the detail view data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Unique prediction identifier
    pub prediction_id: String,

    /// Class id returned by the model
    pub class_id: i64,

    /// Human-readable obesity level
    pub label: String,

    /// Validated input as submitted
    pub input: RawInput,

    /// Encoded row before scaling
    pub features: FeatureRow,

    /// Row after scaling, as fed to the model
    pub scaled: Vec<f32>,

    /// Prediction timestamp
    pub timestamp: DateTime<Utc>,
}

impl PredictionReport {
    /// Create a new report
    pub fn new(
        class_id: i64,
        label: String,
        input: RawInput,
        features: FeatureRow,
        scaled: Vec<f32>,
    ) -> Self {
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            class_id,
            label,
            input,
            features,
            scaled,
            timestamp: Utc::now(),
        }
    }

    /// Label with underscores replaced for display
    pub fn display_label(&self) -> String {
        self.label.replace('_', " ")
    }
}

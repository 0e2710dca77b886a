//! Classification of encoded rows and the end-to-end prediction pipeline

use crate::encoder::FeatureEncoder;
use crate::error::PredictError;
use crate::metrics::ServiceMetrics;
use crate::models::loader::Artifacts;
use crate::types::input::RawInput;
use crate::types::prediction::PredictionReport;
use ort::session::Session;
use ort::value::Tensor;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error};

/// A fitted classifier producing a class id for one scaled row
pub trait Classifier: Send + Sync {
    /// Model name for logs and reports
    fn name(&self) -> &str;

    /// Predict the class id of a single scaled feature row
    fn predict(&self, features: &[f32]) -> Result<i64, PredictError>;
}

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    label_output: Option<String>,
    probability_output: Option<String>,
}

impl OnnxClassifier {
    pub fn new(
        name: &str,
        session: Session,
        input_name: String,
        label_output: Option<String>,
        probability_output: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
        }
    }

    /// Whether the model exposes a class label output, rather than only
    /// probabilities indexed by column
    pub fn has_label_output(&self) -> bool {
        self.label_output.is_some()
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &[f32]) -> Result<i64, PredictError> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| PredictError::model(&self.name, e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictError::model(&self.name, format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| PredictError::model(&self.name, e))?;

        if let Some(label_output) = &self.label_output {
            if let Some(output) = outputs.get(label_output.as_str()) {
                if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                    if let Some(&class_id) = data.first() {
                        debug!(model = %self.name, class_id, "Extracted label output");
                        return Ok(class_id);
                    }
                }
            }
        }

        if let (None, Some(probability_output)) = (&self.label_output, &self.probability_output) {
            if let Some(output) = outputs.get(probability_output.as_str()) {
                if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                    // Column index equals class id only for classes 0..n; the
                    // loader rejects label tables that break this
                    if let Some(class_id) = argmax(data) {
                        debug!(model = %self.name, class_id, "Extracted argmax of probabilities");
                        return Ok(class_id as i64);
                    }
                }
            }
        }

        Err(PredictError::model(
            &self.name,
            "no usable label or probability output",
        ))
    }
}

/// Index of the largest finite value
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

/// Encode → scale → classify → label pipeline over the loaded artifacts
pub struct Predictor {
    artifacts: Arc<Artifacts>,
    encoder: FeatureEncoder,
    metrics: Arc<ServiceMetrics>,
}

impl Predictor {
    pub fn new(artifacts: Arc<Artifacts>, metrics: Arc<ServiceMetrics>) -> Self {
        let encoder = FeatureEncoder::new(artifacts.schema.clone());
        Self {
            artifacts,
            encoder,
            metrics,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Run the full pipeline on one validated input
    pub fn predict(&self, input: &RawInput) -> Result<PredictionReport, PredictError> {
        let start_time = Instant::now();

        let result = self.run(input);
        let elapsed = start_time.elapsed();

        match &result {
            Ok(report) => {
                self.metrics.record_prediction(elapsed, &report.label);
                debug!(
                    prediction_id = %report.prediction_id,
                    class_id = report.class_id,
                    label = %report.label,
                    processing_time_us = elapsed.as_micros(),
                    "Prediction complete"
                );
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(error = %e, model = %self.artifacts.model.name(), "Prediction failed");
            }
        }

        result
    }

    fn run(&self, input: &RawInput) -> Result<PredictionReport, PredictError> {
        let features = self.encoder.encode(input);
        let scaled = self.artifacts.scaler.transform(&features)?;
        let class_id = self.artifacts.model.predict(&scaled)?;

        let label = self
            .artifacts
            .label(class_id)
            .ok_or(PredictError::UnknownClass(class_id))?
            .to_string();

        Ok(PredictionReport::new(
            class_id,
            label,
            input.clone(),
            features,
            scaled,
        ))
    }
}

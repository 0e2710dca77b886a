//! Shared fixtures: the shipped schema and labels with a BMI-rule classifier

use obesity_predictor::error::PredictError;
use obesity_predictor::metrics::ServiceMetrics;
use obesity_predictor::models::loader::{load_labels, load_schema};
use obesity_predictor::models::{Artifacts, Classifier, Predictor, StandardScaler};
use std::path::PathBuf;
use std::sync::Arc;

/// Classifies by BMI, reading Height and Weight from an unscaled row
pub struct BmiClassifier {
    height: usize,
    weight: usize,
}

impl Classifier for BmiClassifier {
    fn name(&self) -> &str {
        "bmi_rule"
    }

    fn predict(&self, features: &[f32]) -> Result<i64, PredictError> {
        let height = features[self.height] as f64;
        let bmi = features[self.weight] as f64 / (height * height);
        Ok(match bmi {
            b if b < 18.5 => 0,
            b if b < 25.0 => 1,
            b if b < 27.5 => 5,
            b if b < 30.0 => 6,
            b if b < 35.0 => 2,
            b if b < 40.0 => 3,
            _ => 4,
        })
    }
}

pub fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

pub fn artifacts() -> Artifacts {
    let dir = artifacts_dir();
    let schema = load_schema(dir.join("columns.json")).unwrap();
    let labels = load_labels(dir.join("target_mapping.json")).unwrap();

    let position = |name: &str| schema.iter().position(|c| c == name).unwrap();
    let model = BmiClassifier {
        height: position("Height"),
        weight: position("Weight"),
    };
    // Identity scaling keeps raw values visible to the rule
    let scaler = StandardScaler::new(vec![0.0; schema.len()], vec![1.0; schema.len()]).unwrap();

    Artifacts::new(Arc::new(model), Arc::new(scaler), schema, labels).unwrap()
}

pub fn predictor() -> Predictor {
    Predictor::new(Arc::new(artifacts()), Arc::new(ServiceMetrics::new()))
}

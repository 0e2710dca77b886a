//! Fitted model artifacts and inference

pub mod inference;
pub mod loader;
pub mod scaler;

pub use inference::{Classifier, OnnxClassifier, Predictor};
pub use loader::{Artifacts, LabelTable, ModelLoader};
pub use scaler::{Scaler, StandardScaler};

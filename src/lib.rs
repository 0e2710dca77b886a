//! Obesity Level Predictor Library
//!
//! Encodes lifestyle and health answers into the column layout of a
//! pre-trained classifier, scales them, and predicts an obesity category.

pub mod config;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use encoder::{FeatureEncoder, FeatureRow};
pub use error::{InputError, PredictError};
pub use models::inference::Predictor;
pub use models::loader::Artifacts;
pub use types::{input::RawInput, prediction::PredictionReport};

//! Column-wise standardization with parameters fitted at training time

use crate::encoder::FeatureRow;
use crate::error::PredictError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Transform applied to an encoded row before it reaches the model
pub trait Scaler: Send + Sync {
    /// Scale a row, producing model input values
    fn transform(&self, row: &FeatureRow) -> Result<Vec<f32>, PredictError>;

    /// Number of columns the scaler was fitted on
    fn width(&self) -> usize;

    /// Column names recorded at fit time, if any
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

/// Fitted standard scaler: `(x - mean) / scale`
///
/// Matches the JSON export of a scikit-learn `StandardScaler`
/// (`mean_`, `scale_` and optionally `feature_names_in_`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Build a scaler, checking that the parameter vectors line up
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            mean,
            scale,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load scaler parameters from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let scaler: StandardScaler = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scaler {}", path.display()))?;
        scaler.validate()?;

        info!(path = %path.display(), width = scaler.mean.len(), "Scaler loaded");
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            bail!(
                "Scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            );
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                bail!(
                    "Scaler records {} feature names for {} columns",
                    names.len(),
                    self.mean.len()
                );
            }
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &FeatureRow) -> Result<Vec<f32>, PredictError> {
        if row.len() != self.mean.len() {
            return Err(PredictError::DimensionMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }

        Ok(row
            .values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| {
                // Constant columns are fitted with a zero scale
                let scale = if scale == 0.0 { 1.0 } else { scale };
                ((x - mean) / scale) as f32
            })
            .collect())
    }

    fn width(&self) -> usize {
        self.mean.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn row(values: Vec<f64>) -> FeatureRow {
        let columns: Vec<String> = (0..values.len()).map(|i| format!("c{}", i)).collect();
        FeatureRow {
            columns: Arc::from(columns),
            values,
        }
    }

    #[test]
    fn test_standardization() {
        let scaler = StandardScaler::new(vec![10.0, 0.5], vec![2.0, 0.5]).unwrap();

        let scaled = scaler.transform(&row(vec![14.0, 0.0])).unwrap();

        assert!((scaled[0] - 2.0).abs() < 1e-6);
        assert!((scaled[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let scaler = StandardScaler::new(vec![1.0], vec![0.0]).unwrap();
        let scaled = scaler.transform(&row(vec![3.0])).unwrap();
        assert_eq!(scaled, vec![2.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();

        let err = scaler.transform(&row(vec![1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(
            err,
            PredictError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_mismatched_parameters_rejected() {
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(
            &path,
            r#"{"mean":[1.0,2.0],"scale":[1.0,4.0],"feature_names":["Age","Weight"]}"#,
        )
        .unwrap();

        let scaler = StandardScaler::load(&path).unwrap();
        assert_eq!(scaler.width(), 2);
        assert_eq!(
            scaler.feature_names().map(|n| n.to_vec()),
            Some(vec!["Age".to_string(), "Weight".to_string()])
        );
    }
}

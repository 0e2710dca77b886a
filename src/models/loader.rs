//! Loading of the training artifacts: ONNX model, scaler, schema and labels

use crate::config::ArtifactsConfig;
use crate::models::inference::{Classifier, OnnxClassifier};
use crate::models::scaler::{Scaler, StandardScaler};
use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Mapping from predicted class id to human-readable label
pub type LabelTable = BTreeMap<i64, String>;

/// Everything loaded once at startup and shared read-only afterwards
pub struct Artifacts {
    pub model: Arc<dyn Classifier>,
    pub scaler: Arc<dyn Scaler>,
    pub schema: Vec<String>,
    pub labels: LabelTable,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("model", &self.model.name())
            .field("scaler_width", &self.scaler.width())
            .field("schema", &self.schema)
            .field("labels", &self.labels)
            .finish()
    }
}

impl Artifacts {
    /// Assemble artifacts from already-constructed parts, checking that the
    /// scaler was fitted on the same columns as the schema.
    pub fn new(
        model: Arc<dyn Classifier>,
        scaler: Arc<dyn Scaler>,
        schema: Vec<String>,
        labels: LabelTable,
    ) -> Result<Self> {
        if schema.is_empty() {
            bail!("Column schema is empty");
        }
        if labels.is_empty() {
            bail!("Label table is empty");
        }
        if scaler.width() != schema.len() {
            bail!(
                "Scaler was fitted on {} columns but schema has {}",
                scaler.width(),
                schema.len()
            );
        }
        if let Some(names) = scaler.feature_names() {
            if names != schema.as_slice() {
                bail!("Scaler feature names do not match the column schema");
            }
        }

        Ok(Self {
            model,
            scaler,
            schema,
            labels,
        })
    }

    /// Load all artifacts from the configured directory
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        let dir = Path::new(&config.dir);

        let schema = load_schema(dir.join(&config.columns_file))?;
        let labels = load_labels(dir.join(&config.labels_file))?;
        let scaler = StandardScaler::load(dir.join(&config.scaler_file))?;

        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load_model(dir.join(&config.model_file), &config.model_name)?;
        if !model.has_label_output() {
            ensure_dense_class_ids(&labels)
                .context("Model only exposes probabilities, so classes must be 0..n")?;
        }

        let artifacts = Self::new(Arc::new(model), Arc::new(scaler), schema, labels)?;

        info!(
            dir = %dir.display(),
            columns = artifacts.schema.len(),
            classes = artifacts.labels.len(),
            "Artifacts loaded"
        );

        Ok(artifacts)
    }

    /// Look up the label of a class id
    pub fn label(&self, class_id: i64) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }
}

/// Load the ordered list of training columns (JSON array of strings)
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read column schema from {}", path.display()))?;
    let columns: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse column schema {}", path.display()))?;

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        bail!("Column schema lists {} twice", dup);
    }

    info!(path = %path.display(), columns = columns.len(), "Column schema loaded");
    Ok(columns)
}

/// Load the class id to label mapping (JSON object keyed by class id)
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<LabelTable> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read label table from {}", path.display()))?;
    let labels: LabelTable = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse label table {}", path.display()))?;

    info!(path = %path.display(), classes = labels.len(), "Label table loaded");
    Ok(labels)
}

/// Check that class ids are exactly `0..n`, so a probability column index
/// can stand in for the class id
pub fn ensure_dense_class_ids(labels: &LabelTable) -> Result<()> {
    for (expected, &class_id) in labels.keys().enumerate() {
        if class_id != expected as i64 {
            bail!(
                "Label table has class id {} where {} was expected",
                class_id,
                expected
            );
        }
    }
    Ok(())
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the classifier from an ONNX file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<OnnxClassifier> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx classifiers emit "label" and "probabilities"
        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone());

        if label_output.is_none() && probability_output.is_none() {
            bail!(
                "Model {} exposes neither a label nor a probability output",
                path.display()
            );
        }

        info!(
            model = %name,
            input = %input_name,
            label_output = ?label_output,
            probability_output = ?probability_output,
            "Model loaded successfully"
        );

        Ok(OnnxClassifier::new(
            name,
            session,
            input_name,
            label_output,
            probability_output,
        ))
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use ort::session::Session;

use super::classifier::FaceShapeClassifier;
use super::error::ClassifierError;
use crate::model_manager::ModelManager;
use crate::models::{BuiltinModel, ModelCharacteristics, Preprocessing};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A builder for constructing a FaceShapeClassifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    model_path: Option<String>,
    labels_path: Option<String>,
    session: Option<Session>,
    labels: Option<Vec<String>>,
    model_characteristics: Option<ModelCharacteristics>,
    runtime_config: RuntimeConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder with default runtime configuration
    pub fn new() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            session: None,
            labels: None,
            model_characteristics: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets the model to use from the built-in registry.
    ///
    /// The model must already be downloaded through [`ModelManager`]; the
    /// builder never fetches artifacts itself.
    ///
    /// # Errors
    /// * `BuildError` if paths are already set, the model is not downloaded,
    ///   or the model/label files fail to load or validate.
    pub fn with_model(mut self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.labels_path.is_some() {
            return Err(ClassifierError::BuildError("Model and label paths already set".to_string()));
        }

        let manager = ModelManager::new_default()
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?;

        if !manager.is_model_downloaded(model) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::download_model()",
                model
            )));
        }

        let model_path = manager.get_model_path(model);
        let labels_path = manager.get_labels_path(model);

        let labels = Self::load_labels(&labels_path)?;
        info!("Loaded {} class labels", labels.len());

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(&model_path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.model_characteristics = Some(model.characteristics());
        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.labels_path = Some(labels_path.to_string_lossy().to_string());
        self.labels = Some(labels);
        self.session = Some(session);
        Ok(self)
    }

    /// Sets a custom model and label-index file for the classifier.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `labels_path` - Path to the label-index JSON file (label -> output index)
    /// * `characteristics` - Optional input geometry and normalization. When
    ///   not provided, defaults to 224x224 with TF-style [-1, 1] scaling.
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        labels_path: &str,
        characteristics: Option<ModelCharacteristics>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || labels_path.is_empty() {
            return Err(ClassifierError::BuildError("Model and label paths cannot be empty".to_string()));
        }
        if self.model_path.is_some() || self.labels_path.is_some() {
            return Err(ClassifierError::BuildError("Model and label paths already set".to_string()));
        }
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path)));
        }
        if !Path::new(labels_path).exists() {
            return Err(ClassifierError::BuildError(format!("Label file not found: {}", labels_path)));
        }

        let labels = Self::load_labels(Path::new(labels_path))?;
        info!("Loaded {} class labels", labels.len());

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.model_characteristics = Some(characteristics.unwrap_or(ModelCharacteristics {
            input_width: 224,
            input_height: 224,
            preprocessing: Preprocessing::TfStyle,
            model_size_mb: 0,
        }));
        self.model_path = Some(model_path.to_string());
        self.labels_path = Some(labels_path.to_string());
        self.labels = Some(labels);
        self.session = Some(session);
        Ok(self)
    }

    /// Parses a `class_indices.json` style table (label -> output index) and
    /// inverts it into an index-ordered label vector.
    fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ClassifierError::LabelError(format!("Failed to read label file: {}", e)))?;
        let indices: HashMap<String, usize> = serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::LabelError(format!("Failed to parse label file: {}", e)))?;

        if indices.is_empty() {
            return Err(ClassifierError::LabelError("Label file defines no classes".into()));
        }

        let mut labels = vec![None; indices.len()];
        for (label, index) in indices {
            let slot = labels.get_mut(index).ok_or_else(|| {
                ClassifierError::LabelError(format!(
                    "Label '{}' has out-of-range index {}",
                    label, index
                ))
            })?;
            if slot.replace(label).is_some() {
                return Err(ClassifierError::LabelError(format!(
                    "Duplicate label index {}",
                    index
                )));
            }
        }

        // Every slot is filled: the map had n entries with unique indices in 0..n.
        Ok(labels.into_iter().flatten().collect())
    }

    /// Validates that the model has the expected structure: exactly one image
    /// input and at least one output.
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.len() != 1 {
            error!("Invalid model: expected 1 input, got {}", session.inputs.len());
            return Err(ClassifierError::BuildError(format!(
                "Model must have exactly one input, found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::BuildError("Model has no outputs".to_string()));
        }
        Ok(())
    }

    /// Builds and returns the final FaceShapeClassifier instance
    ///
    /// # Errors
    /// * `BuildError` if no model was set
    pub fn build(self) -> Result<FaceShapeClassifier, ClassifierError> {
        let session = self
            .session
            .ok_or_else(|| ClassifierError::BuildError("No model set. Call with_model() or with_custom_model() first".to_string()))?;
        let labels = self
            .labels
            .ok_or_else(|| ClassifierError::BuildError("No labels loaded".to_string()))?;
        let model_characteristics = self
            .model_characteristics
            .ok_or_else(|| ClassifierError::BuildError("Model characteristics not set".to_string()))?;

        Ok(FaceShapeClassifier {
            model_path: self.model_path.unwrap_or_default(),
            labels_path: self.labels_path.unwrap_or_default(),
            session: Arc::new(session),
            labels: Arc::new(labels),
            model_characteristics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_labels(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write labels");
        file
    }

    #[test]
    fn test_load_labels_inverts_index_table() {
        let file = write_labels(r#"{"Heart": 0, "Oval": 1, "Round": 2}"#);
        let labels = ClassifierBuilder::load_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["Heart", "Oval", "Round"]);
    }

    #[test]
    fn test_load_labels_rejects_gaps() {
        let file = write_labels(r#"{"Heart": 0, "Oval": 5}"#);
        assert!(ClassifierBuilder::load_labels(file.path()).is_err());
    }

    #[test]
    fn test_load_labels_rejects_duplicates() {
        let file = write_labels(r#"{"Heart": 0, "Oval": 0}"#);
        assert!(ClassifierBuilder::load_labels(file.path()).is_err());
    }

    #[test]
    fn test_load_labels_rejects_empty_table() {
        let file = write_labels("{}");
        assert!(ClassifierBuilder::load_labels(file.path()).is_err());
    }

    #[test]
    fn test_build_without_model_fails() {
        let result = ClassifierBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_model_missing_files() {
        let result = ClassifierBuilder::new().with_custom_model(
            "/nonexistent/model.onnx",
            "/nonexistent/class_indices.json",
            None,
        );
        assert!(result.is_err());
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::preprocess::image_to_input;
use super::{ClassifierInfo, Prediction, ShapePredictor};
use crate::models::ModelCharacteristics;

/// A thread-safe face shape classifier backed by an ONNX model.
///
/// All fields are either immutable values or wrapped in `Arc`, so the
/// classifier is `Send + Sync` and can be shared across request handlers
/// without locking. Each `predict` call is independent.
#[derive(Debug)]
pub struct FaceShapeClassifier {
    pub model_path: String,
    pub labels_path: String,
    pub session: Arc<Session>,
    pub labels: Arc<Vec<String>>,
    pub model_characteristics: ModelCharacteristics,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<FaceShapeClassifier>();
    }
};

impl FaceShapeClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            num_classes: self.labels.len(),
            class_labels: self.labels.as_ref().clone(),
            input_width: self.model_characteristics.input_width,
            input_height: self.model_characteristics.input_height,
        }
    }

    fn run_model(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let input = image_to_input(image, &self.model_characteristics);
        let input_dyn = input.into_dyn();
        let input_view = input_dyn.as_standard_layout();

        let input_name = self
            .session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ClassifierError::ModelError("Model has no inputs".into()))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            input_name.as_str(),
            Tensor::from_array(&input_view)
                .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        // Expected output shape: [1, num_classes]
        let probs: Vec<f32> = output_tensor.iter().cloned().collect();
        Ok(probs)
    }
}

impl ShapePredictor for FaceShapeClassifier {
    /// Predicts the face shape of the given image.
    ///
    /// Returns the arg-max label, its probability scaled to a percentage in
    /// (0, 100], and the full per-label score map.
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let probs = self.run_model(image)?;

        if probs.len() != self.labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores but {} labels are configured",
                probs.len(),
                self.labels.len()
            )));
        }

        let (best_index, best_prob) = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| ClassifierError::PredictionError("Model produced an empty score vector".into()))?;

        let scores = self
            .labels
            .iter()
            .cloned()
            .zip(probs.iter().cloned())
            .collect::<HashMap<String, f32>>();

        Ok(Prediction {
            label: self.labels[best_index].clone(),
            confidence: best_prob * 100.0,
            scores,
        })
    }

    fn labels(&self) -> Vec<String> {
        self.labels.as_ref().clone()
    }
}

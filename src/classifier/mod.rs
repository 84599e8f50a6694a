//! Face shape classification on top of ONNX Runtime.
//!
//! [`FaceShapeClassifier`] owns the session and label table;
//! [`ShapePredictor`] is the seam request handlers depend on, so tests can
//! substitute a stub predictor without model files.

mod builder;
mod classifier;
mod error;
mod preprocess;

pub use builder::ClassifierBuilder;
pub use classifier::FaceShapeClassifier;
pub use error::ClassifierError;

use std::collections::HashMap;

use image::DynamicImage;

/// The outcome of a single classification.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The arg-max label, in the casing of the label table.
    pub label: String,
    /// Probability of the arg-max label scaled to a percentage in (0, 100].
    pub confidence: f32,
    /// Full per-label score map.
    pub scores: HashMap<String, f32>,
}

/// The classification seam consumed by the HTTP layer.
pub trait ShapePredictor: Send + Sync {
    /// Classifies a decoded image into a face shape category.
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError>;

    /// The labels this predictor can emit, in output-index order.
    fn labels(&self) -> Vec<String>;
}

/// Information about a classifier's current state
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub model_path: String,
    pub labels_path: String,
    pub num_classes: usize,
    pub class_labels: Vec<String>,
    pub input_width: u32,
    pub input_height: u32,
}

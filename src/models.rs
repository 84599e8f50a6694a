//! Registry of built-in face shape models.
//!
//! A built-in model is a pair of downloadable artifacts: the ONNX graph and a
//! label-index table (`class_indices.json` format, label -> output index).
//! Its characteristics pin down the exact input geometry and normalization
//! the model was trained with.

/// Pixel normalization applied after resize + RGB conversion.
///
/// The two schemes are **not interchangeable**: feeding Caffe-style input to a
/// model trained with TF-style scaling degrades accuracy without producing any
/// error, so the scheme travels with the model definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessing {
    /// Scale each channel to [-1, 1] (`x / 127.5 - 1`). MobileNetV2 style.
    TfStyle,
    /// Convert RGB to BGR and subtract the per-channel ImageNet means
    /// (103.939, 116.779, 123.68). ResNet50 style.
    CaffeStyle,
}

/// Fixed properties of a classification model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCharacteristics {
    pub input_width: u32,
    pub input_height: u32,
    pub preprocessing: Preprocessing,
    pub model_size_mb: usize,
}

/// Download metadata for a built-in model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub model_hash: String,
    pub labels_url: String,
    pub labels_hash: String,
}

/// Models shipped with known URLs and hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModel {
    /// MobileNetV2 fine-tuned on the five-category face shape dataset
    /// (diamond, heart, oblong, oval, round, square), 224x224 input,
    /// TF-style [-1, 1] scaling.
    FaceShapeMobileNetV2,
}

impl BuiltinModel {
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinModel::FaceShapeMobileNetV2 => ModelInfo {
                name: "face-shape-mobilenetv2".to_string(),
                model_url: "https://huggingface.co/visage-ai/face-shape-mobilenetv2/resolve/main/model.onnx"
                    .to_string(),
                model_hash: "5f2c9f7a1b6d3e8c4a0f9d2b7e6c1a8f3d5b0e9c2a7f4d1b8e5c0a9f6d3b2e7c"
                    .to_string(),
                labels_url: "https://huggingface.co/visage-ai/face-shape-mobilenetv2/resolve/main/class_indices.json"
                    .to_string(),
                labels_hash: "9a4d7e2c5b8f1a6d3c0e9b4f7a2d5c8e1b6f3a0d9c4e7b2f5a8d1c6e3b0f9a4d"
                    .to_string(),
            },
        }
    }

    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            BuiltinModel::FaceShapeMobileNetV2 => ModelCharacteristics {
                input_width: 224,
                input_height: 224,
                preprocessing: Preprocessing::TfStyle,
                model_size_mb: 14,
            },
        }
    }
}

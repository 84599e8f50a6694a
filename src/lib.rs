//! Face shape prediction and hairstyle recommendation service.
//!
//! The crate pairs an ONNX image classifier with a filesystem-backed style
//! catalog: an uploaded photograph is classified into a face shape category,
//! and the category (optionally with a gender partition) selects a bounded
//! set of recommendation images from the asset store.
//!
//! # Resolving recommendations
//!
//! ```rust
//! use visage::{Gender, StyleCatalog};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = StyleCatalog::new("hairstyles", true);
//! let picks = catalog.resolve("Heart", Some(Gender::Female), 3)?;
//! for asset in picks {
//!     println!("{} -> {}", asset.name, asset.image_url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread safety
//!
//! [`FaceShapeClassifier`] wraps its session and label table in `Arc` and is
//! `Send + Sync`; the [`StyleCatalog`] is a stateless read-only view. Both can
//! be shared across request handlers without locking.

pub mod catalog;
pub mod classifier;
pub mod http;
pub mod model_manager;
pub mod models;
mod runtime;

pub use catalog::{
    CatalogError, DetailCatalog, DetailError, Gender, ShapeDetails, StyleAsset, StyleCatalog,
    DEFAULT_DESCRIPTION, DEFAULT_TIP, IMAGE_URL_PREFIX,
};
pub use classifier::{
    ClassifierBuilder, ClassifierError, ClassifierInfo, FaceShapeClassifier, Prediction,
    ShapePredictor,
};
pub use http::{build_router, AppState};
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo, Preprocessing};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}

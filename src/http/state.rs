use std::sync::Arc;

use crate::catalog::{DetailCatalog, StyleCatalog};
use crate::classifier::ShapePredictor;

/// Shared, immutable per-process state injected into request handlers.
///
/// Everything is built once in `main` and cloned per request; there are no
/// module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn ShapePredictor>,
    pub styles: Arc<StyleCatalog>,
    pub details: Arc<DetailCatalog>,
    /// Upper bound on recommendations returned by the predict endpoint.
    pub max_recommendations: usize,
}

impl AppState {
    pub fn new(
        predictor: Arc<dyn ShapePredictor>,
        styles: StyleCatalog,
        details: DetailCatalog,
        max_recommendations: usize,
    ) -> Self {
        Self {
            predictor,
            styles: Arc::new(styles),
            details: Arc::new(details),
            max_recommendations,
        }
    }
}

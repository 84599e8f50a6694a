//! Hairstyle recommendation catalogs: the filesystem-backed style store and
//! the static per-category detail table.

mod details;
mod resolver;

pub use details::{DetailCatalog, DetailError, ShapeDetails, DEFAULT_DESCRIPTION, DEFAULT_TIP};
pub use resolver::{CatalogError, Gender, StyleAsset, StyleCatalog, IMAGE_URL_PREFIX};

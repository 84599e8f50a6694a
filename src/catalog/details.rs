use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Placeholder text returned for categories absent from the table.
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_TIP: &str = "No tips available";

#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error("Failed to read detail file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse detail file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static description and styling tips for one face shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDetails {
    pub description: String,
    pub tips: Vec<String>,
}

/// Lookup table of per-category details, loaded once at startup and never
/// mutated. Keys are matched case-insensitively against classifier labels.
#[derive(Debug, Clone, Default)]
pub struct DetailCatalog {
    entries: HashMap<String, ShapeDetails>,
}

impl DetailCatalog {
    /// The detail table compiled into the binary.
    pub fn builtin() -> Self {
        let raw = include_str!("../../assets/face_shape_details.json");
        serde_json::from_str::<HashMap<String, ShapeDetails>>(raw)
            .map(Self::from_entries)
            .expect("built-in detail table is valid JSON")
    }

    /// Loads a detail table from a JSON file mapping category -> details.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DetailError> {
        let raw = fs::read_to_string(path)?;
        let entries: HashMap<String, ShapeDetails> = serde_json::from_str(&raw)?;
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: HashMap<String, ShapeDetails>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Returns the details for a category, or documented placeholder text
    /// when the category has no entry. A miss is never an error.
    pub fn get(&self, category: &str) -> ShapeDetails {
        self.entries
            .get(&category.to_lowercase())
            .cloned()
            .unwrap_or_else(|| ShapeDetails {
                description: DEFAULT_DESCRIPTION.to_string(),
                tips: vec![DEFAULT_TIP.to_string()],
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_covers_known_shapes() {
        let catalog = DetailCatalog::builtin();
        for shape in ["oval", "round", "square", "heart", "diamond", "oblong"] {
            let details = catalog.get(shape);
            assert_ne!(details.description, DEFAULT_DESCRIPTION, "missing {}", shape);
            assert!(!details.tips.is_empty());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = DetailCatalog::builtin();
        assert_eq!(catalog.get("Oval"), catalog.get("oval"));
        assert_eq!(catalog.get("HEART"), catalog.get("heart"));
    }

    #[test]
    fn test_miss_returns_placeholders() {
        let catalog = DetailCatalog::default();
        let details = catalog.get("unknown");
        assert_eq!(details.description, DEFAULT_DESCRIPTION);
        assert_eq!(details.tips, vec![DEFAULT_TIP.to_string()]);
    }
}

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// URL prefix the static asset tree is served under.
pub const IMAGE_URL_PREFIX: &str = "/images";

// Directory entries outside this allow-list are ignored without error.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Demographic partition of a gendered style catalog.
///
/// Values outside this set are rejected at the service boundary; there is no
/// silent defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            other => Err(format!("Gender must be 'male' or 'female', got '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("This catalog is partitioned by gender; a gender value is required")]
    GenderRequired,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One recommendation image: a display name derived from the filename and a
/// URL path under [`IMAGE_URL_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleAsset {
    pub name: String,
    pub image_url: String,
}

/// Read-only view over the hairstyle asset store.
///
/// The store is a directory tree `<root>/[<gender>/]<category>/<file>` with
/// lower-cased category directory names. Every call reads the filesystem
/// fresh; there is no listing cache, so deployments may add or remove assets
/// without restarting the service.
///
/// Not-found policy: an absent or empty partition yields an empty list, never
/// an error. Callers that require at least one result translate empty into
/// their own catalogued failure.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    root: PathBuf,
    gendered: bool,
}

impl StyleCatalog {
    pub fn new<P: AsRef<Path>>(root: P, gendered: bool) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            gendered,
        }
    }

    /// Whether this catalog is partitioned by gender.
    pub fn is_gendered(&self) -> bool {
        self.gendered
    }

    /// Resolves up to `max_count` recommendation assets for a category.
    ///
    /// Selection is a uniform random sample without replacement drawn from
    /// `rng`, so two calls for the same category may return different assets.
    /// Partitions with at most `max_count` eligible images are returned in
    /// full, in lexicographic order.
    pub fn resolve_with<R: Rng + ?Sized>(
        &self,
        category: &str,
        gender: Option<Gender>,
        max_count: usize,
        rng: &mut R,
    ) -> Result<Vec<StyleAsset>, CatalogError> {
        let files = self.eligible_files(category, gender)?;

        let selected: Vec<String> = if files.len() <= max_count {
            files
        } else {
            files
                .choose_multiple(rng, max_count)
                .cloned()
                .collect()
        };

        Ok(self.to_assets(category, gender, selected))
    }

    /// Resolves with the thread-local randomness source.
    pub fn resolve(
        &self,
        category: &str,
        gender: Option<Gender>,
        max_count: usize,
    ) -> Result<Vec<StyleAsset>, CatalogError> {
        self.resolve_with(category, gender, max_count, &mut rand::thread_rng())
    }

    /// Lists every eligible asset in a partition, in lexicographic order.
    pub fn list(
        &self,
        category: &str,
        gender: Option<Gender>,
    ) -> Result<Vec<StyleAsset>, CatalogError> {
        let files = self.eligible_files(category, gender)?;
        Ok(self.to_assets(category, gender, files))
    }

    /// Returns the sorted filenames of eligible images in the partition, or
    /// an empty vector when the partition does not exist or the category does
    /// not normalize to a valid directory name.
    fn eligible_files(
        &self,
        category: &str,
        gender: Option<Gender>,
    ) -> Result<Vec<String>, CatalogError> {
        let category = match normalize_category(category) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        if self.gendered && gender.is_none() {
            return Err(CatalogError::GenderRequired);
        }

        let mut dir = self.root.clone();
        if self.gendered {
            // Checked above; gendered catalogs always have Some(gender) here.
            if let Some(g) = gender {
                dir.push(g.as_str());
            }
        }
        dir.push(&category);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CatalogError::Io(e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if has_image_extension(name) {
                files.push(name.to_string());
            }
        }
        files.sort();
        Ok(files)
    }

    fn to_assets(
        &self,
        category: &str,
        gender: Option<Gender>,
        files: Vec<String>,
    ) -> Vec<StyleAsset> {
        // eligible_files returned a non-empty list, so normalization succeeded.
        let category = normalize_category(category).unwrap_or_default();
        files
            .into_iter()
            .map(|file| {
                let image_url = match (self.gendered, gender) {
                    (true, Some(g)) => {
                        format!("{}/{}/{}/{}", IMAGE_URL_PREFIX, g.as_str(), category, file)
                    }
                    _ => format!("{}/{}/{}", IMAGE_URL_PREFIX, category, file),
                };
                StyleAsset {
                    name: display_name(&file),
                    image_url,
                }
            })
            .collect()
    }
}

/// Folds a category label to the store's directory naming convention.
///
/// Returns `None` for labels that cannot name a partition directory (empty,
/// or containing characters outside `[a-z0-9_-]` after folding). This also
/// keeps labels from escaping the store root.
fn normalize_category(category: &str) -> Option<String> {
    let folded = category.trim().to_lowercase();
    if folded.is_empty() {
        return None;
    }
    if !folded
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return None;
    }
    Some(folded)
}

fn has_image_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Derives a display name from an asset filename:
/// `"chin_length_bob.jpg"` -> `"Chin Length Bob"`.
fn display_name(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(filename);
    stem.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_title_cases_words() {
        assert_eq!(display_name("chin_length_bob.jpg"), "Chin Length Bob");
        assert_eq!(display_name("side-swept-bangs.png"), "Side Swept Bangs");
        assert_eq!(display_name("PIXIE_CUT.JPG"), "Pixie Cut");
        assert_eq!(display_name("bob.jpeg"), "Bob");
    }

    #[test]
    fn test_display_name_without_extension() {
        assert_eq!(display_name("long_layers"), "Long Layers");
    }

    #[test]
    fn test_normalize_category_folds_case() {
        assert_eq!(normalize_category("Heart"), Some("heart".to_string()));
        assert_eq!(normalize_category(" OVAL "), Some("oval".to_string()));
    }

    #[test]
    fn test_normalize_category_rejects_unsafe_labels() {
        assert_eq!(normalize_category(""), None);
        assert_eq!(normalize_category("   "), None);
        assert_eq!(normalize_category("../etc"), None);
        assert_eq!(normalize_category("heart/../../x"), None);
        assert_eq!(normalize_category("round shape"), None);
    }

    #[test]
    fn test_image_extension_allow_list() {
        assert!(has_image_extension("a.jpg"));
        assert!(has_image_extension("a.JPEG"));
        assert!(has_image_extension("a.png"));
        assert!(!has_image_extension("a.txt"));
        assert!(!has_image_extension(".DS_Store"));
        assert!(!has_image_extension("noext"));
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }
}

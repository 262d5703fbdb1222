use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{slugify, ConfigError};

/// A brand name the harvester may fall back on when no structural strategy
/// finds brand links on the catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownBrand {
    pub name: String,
    /// Catalog path segment; derived from `name` when omitted.
    #[serde(default)]
    pub slug: Option<String>,
}

impl KnownBrand {
    #[must_use]
    pub fn slug(&self) -> String {
        match &self.slug {
            Some(explicit) if !explicit.trim().is_empty() => slugify(explicit),
            _ => slugify(&self.name),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KnownBrandsFile {
    #[serde(default)]
    pub brands: Vec<KnownBrand>,
}

/// Load and validate the known-brands table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_known_brands(path: &Path) -> Result<KnownBrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KnownBrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_known_brands(&content)
}

/// Parse and validate known-brands YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_known_brands(content: &str) -> Result<KnownBrandsFile, ConfigError> {
    let file: KnownBrandsFile = serde_yaml::from_str(content)?;
    validate_known_brands(&file)?;
    Ok(file)
}

fn validate_known_brands(file: &KnownBrandsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for brand in &file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        let slug = brand.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "brand '{}' produces an empty slug",
                brand.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand slug: '{}' (from brand '{}')",
                slug, brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_with_optional_slugs() {
        let file = parse_known_brands(
            "brands:\n  - name: Must Have\n  - name: Darkside\n    slug: darkside\n",
        )
        .unwrap();
        assert_eq!(file.brands.len(), 2);
        assert_eq!(file.brands[0].slug(), "must-have");
        assert_eq!(file.brands[1].slug(), "darkside");
    }

    #[test]
    fn empty_document_yields_no_brands() {
        let file = parse_known_brands("brands: []\n").unwrap();
        assert!(file.brands.is_empty());
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let brand = KnownBrand {
            name: "Black Burn".to_string(),
            slug: Some("  Black_Burn ".to_string()),
        };
        assert_eq!(brand.slug(), "black-burn");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let err = parse_known_brands("brands:\n  - name: '  '\n").unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_duplicate_slug() {
        let err = parse_known_brands("brands:\n  - name: Must Have\n  - name: must-have\n")
            .unwrap_err();
        assert!(err.to_string().contains("duplicate brand slug"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_known_brands("brands: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::KnownBrandsFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_known_brands(Path::new("/nonexistent/known_brands.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::KnownBrandsFileIo { .. }));
    }
}

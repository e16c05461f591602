use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CATALOG_PATH: &str = "bmw_class_names.json";

// internal class id -> display name
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct ClassMap(BTreeMap<String, String>);

/// The fixed catalog of known models. The class file also carries non-car
/// classes ("non_bmw...", "non_cars..."); those never feed the pipeline.
#[derive(Debug)]
pub struct Catalog {
    models: Vec<String>,
}

impl Catalog {
    /// A missing or unreadable catalog is the one fatal startup condition.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("critical: {} not found", path.display()))?;
        let ClassMap(classes) = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid class map", path.display()))?;

        let models = classes
            .into_values()
            .filter(|m| !m.contains("non_bmw") && !m.contains("non_cars"))
            .collect();
        Ok(Self { models })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    #[cfg(test)]
    pub(crate) fn from_models(models: Vec<String>) -> Self {
        Self { models }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_filters_non_car_classes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"0": "1989_bmw_E30", "1": "non_bmw_car", "2": "non_cars_misc", "3": "bmw_Z3_roadster"}}"#
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.models().len(), 2);
        assert!(catalog.models().iter().any(|m| m == "1989_bmw_E30"));
        assert!(catalog.models().iter().all(|m| !m.contains("non_")));
    }

    #[test]
    fn missing_catalog_is_an_error() {
        assert!(Catalog::load("definitely/not/here.json").is_err());
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(Catalog::load(&path).is_err());
    }
}

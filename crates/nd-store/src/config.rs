//! TOML configuration: engine knobs plus an optional replacement catalog.
//!
//! ```toml
//! [engine]
//! detection_mode = "signal"
//! eps = 0.35
//!
//! [[taxonomy]]
//! name = "DeFi Evolution"
//! keywords = ["defi", "yield", "liquidity"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use nd_core::{EngineConfig, NarrativeEngine, Taxonomy, TaxonomyEntry};

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    taxonomy: Vec<TaxonomyEntry>,
}

/// A validated engine configuration and catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub engine: EngineConfig,
    pub taxonomy: Taxonomy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            taxonomy: Taxonomy::builtin(),
        }
    }
}

impl Settings {
    /// Parse TOML. A missing `[[taxonomy]]` keeps the built-in catalog.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        file.engine.validate()?;
        let taxonomy = if file.taxonomy.is_empty() {
            Taxonomy::builtin()
        } else {
            Taxonomy::new(file.taxonomy)?
        };
        Ok(Self {
            engine: file.engine,
            taxonomy,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let settings = Self::from_toml(&raw)?;
        tracing::debug!(
            "loaded config from {} ({} catalog entries)",
            path.display(),
            settings.taxonomy.len()
        );
        Ok(settings)
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn into_engine(self) -> Result<NarrativeEngine> {
        Ok(NarrativeEngine::new(self.engine, self.taxonomy)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use nd_core::DetectionMode;

    #[test]
    fn test_empty_file_is_default() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_engine_overrides_and_custom_taxonomy() {
        let s = Settings::from_toml(
            r#"
            [engine]
            detection_mode = "signal"
            eps = 0.35
            extra_stop_words = ["acme"]

            [[taxonomy]]
            name = "Payments"
            keywords = ["payment", "merchant"]
            "#,
        )
        .unwrap();
        assert_eq!(s.engine.detection_mode, DetectionMode::Signal);
        assert_eq!(s.engine.eps, 0.35);
        assert_eq!(s.engine.min_samples, 3);
        assert_eq!(s.engine.extra_stop_words, vec!["acme"]);
        assert_eq!(s.taxonomy.len(), 1);
        assert_eq!(s.taxonomy.entries()[0].name, "Payments");
        assert!(s.into_engine().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_toml("[engine]\nmax_df = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("max_df"));

        let err = Settings::from_toml("[[taxonomy]]\nname = \"Empty\"\nkeywords = []\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));

        assert!(matches!(
            Settings::from_toml("[engine\n"),
            Err(StoreError::Toml(_))
        ));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let err = Settings::from_toml("[engine]\nfallback_confidence_divisor = nan\n").unwrap_err();
        assert!(err.to_string().contains("fallback_confidence_divisor"));

        let err = Settings::from_toml("[engine]\nrecency_window_hours = inf\n").unwrap_err();
        assert!(err.to_string().contains("recency_window_hours"));

        let err = Settings::from_toml("[engine]\nkeyword_weight_floor = nan\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nd.toml");
        fs::write(&path, "[engine]\nmin_documents = 8\n").unwrap();
        let s = Settings::load_or_default(Some(&path)).unwrap();
        assert_eq!(s.engine.min_documents, 8);
        assert!(matches!(
            Settings::load(&dir.path().join("missing.toml")),
            Err(StoreError::Io(_))
        ));
    }
}

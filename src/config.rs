//! Run configuration: ontology list and resource profiles
//!
//! The config JSON is an ordered list of one-entry objects mapping an
//! ontology IRI to a root class IRI (or an empty string for "whole
//! ontology"). A profile is a directory of conventionally named resource
//! CSVs selecting which tables and bucket schemes to load.

use crate::error::MapError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered `(ontology_iri, root_iri)` pairs. Later entries override
/// earlier ones that name the same ontology.
pub fn parse_ontology_config(text: &str) -> Result<Vec<(String, String)>, MapError> {
    let value: Value = serde_json::from_str(text)?;
    let entries = value
        .as_array()
        .ok_or_else(|| MapError::Input("config must be a JSON list".to_string()))?;

    let mut ordered: Vec<(String, String)> = Vec::new();
    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| MapError::Input("config entries must be objects".to_string()))?;
        if object.len() != 1 {
            return Err(MapError::Input(
                "config entries must have exactly one key".to_string(),
            ));
        }
        let (iri, root) = object.iter().next().expect("len checked above");
        let root = root
            .as_str()
            .ok_or_else(|| MapError::Input(format!("root for {iri} must be a string")))?
            .to_string();
        match ordered.iter_mut().find(|(existing, _)| existing == iri) {
            Some(slot) => slot.1 = root,
            None => ordered.push((iri.clone(), root)),
        }
    }
    Ok(ordered)
}

/// Read and parse a config file.
pub fn load_ontology_config(path: &Path) -> Result<Vec<(String, String)>, MapError> {
    let text =
        fs::read_to_string(path).map_err(|e| MapError::Input(format!("{}: {e}", path.display())))?;
    parse_ontology_config(&text)
}

/// A resource profile: the directory holding the pre-built tables.
#[derive(Debug, Clone)]
pub struct Profile {
    dir: PathBuf,
}

impl Profile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Profile { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn resource_terms(&self) -> PathBuf {
        self.dir.join("resource-terms.csv")
    }

    pub fn resource_parents(&self) -> PathBuf {
        self.dir.join("resource-parents.csv")
    }

    pub fn lexmapr_buckets(&self) -> PathBuf {
        self.dir.join("buckets-lexmapr.csv")
    }

    pub fn ifsac_buckets(&self) -> PathBuf {
        self.dir.join("buckets-ifsactop.csv")
    }

    pub fn bucket_labels(&self) -> PathBuf {
        self.dir.join("bucket-labels.csv")
    }

    pub fn refinements(&self) -> PathBuf {
        self.dir.join("refinements.csv")
    }

    pub fn default_labels(&self) -> PathBuf {
        self.dir.join("default-labels.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_order_preserved() {
        let config = parse_ontology_config(
            r#"[{"http://x/foodon.owl": "http://x/root1"},
                {"http://x/envo.owl": ""}]"#,
        )
        .unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config[0].0, "http://x/foodon.owl");
        assert_eq!(config[0].1, "http://x/root1");
        assert_eq!(config[1].1, "");
    }

    #[test]
    fn test_later_entry_overrides() {
        let config = parse_ontology_config(
            r#"[{"http://x/foodon.owl": "http://x/rootA"},
                {"http://x/foodon.owl": "http://x/rootB"}]"#,
        )
        .unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config[0].1, "http://x/rootB");
    }

    #[test]
    fn test_bad_shapes_rejected() {
        assert!(parse_ontology_config(r#"{"not": "a list"}"#).is_err());
        assert!(parse_ontology_config(r#"[{"a": "x", "b": "y"}]"#).is_err());
        assert!(parse_ontology_config(r#"[{"a": 7}]"#).is_err());
    }

    #[test]
    fn test_profile_paths() {
        let profile = Profile::new("/data/narms");
        assert_eq!(
            profile.resource_terms(),
            PathBuf::from("/data/narms/resource-terms.csv")
        );
        assert_eq!(
            profile.refinements(),
            PathBuf::from("/data/narms/refinements.csv")
        );
    }
}

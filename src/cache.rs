//! On-disk cache for compiled bucket rules
//!
//! Compiled rule trees are stored as a JSON document `{bucket_id: rule}`
//! next to the ontology file, keyed by the root class iri. The cache is
//! regenerated when its modification time is older than the ontology file.

use crate::compiler::{compile_all, compile_buckets};
use crate::error::MapError;
use crate::ontology::OntologyGraph;
use crate::rules::RuleTree;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Where the rule cache for `ontology_path` + `root` lives.
pub fn cache_path(ontology_path: &Path, root: &str) -> PathBuf {
    let stem = ontology_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ontology");
    let root_key: String = if root.is_empty() {
        "all".to_string()
    } else {
        root.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    };
    ontology_path.with_file_name(format!("{stem}.{root_key}.rules.json"))
}

/// Load the compiled rules from cache, or compile and write them.
///
/// `no_cache` forces recompilation and skips both read and write.
pub fn load_or_compile(
    ontology_path: &Path,
    graph: &OntologyGraph,
    root: &str,
    no_cache: bool,
) -> Result<FxHashMap<String, RuleTree>, MapError> {
    let path = cache_path(ontology_path, root);

    if !no_cache && is_fresh(&path, ontology_path) {
        match read_cache(&path) {
            Ok(rules) => {
                debug!(cache = %path.display(), buckets = rules.len(), "rule cache hit");
                return Ok(rules);
            }
            Err(e) => {
                // A corrupt cache is not fatal; fall through to recompile.
                info!(cache = %path.display(), error = %e, "discarding unreadable rule cache");
            }
        }
    }

    let rules = if root.is_empty() {
        compile_all(graph)
    } else {
        compile_buckets(graph, root)
    };
    if !no_cache {
        write_cache(&path, &rules)?;
        info!(cache = %path.display(), buckets = rules.len(), "rebuilt rule cache");
    }
    Ok(rules)
}

/// True when the cache exists and is at least as new as the source.
fn is_fresh(cache: &Path, source: &Path) -> bool {
    match (mtime(cache), mtime(source)) {
        (Some(cache_time), Some(source_time)) => cache_time >= source_time,
        (Some(_), None) => true,
        _ => false,
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn read_cache(path: &Path) -> Result<FxHashMap<String, RuleTree>, MapError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_cache(path: &Path, rules: &FxHashMap<String, RuleTree>) -> Result<(), MapError> {
    let text = serde_json::to_string_pretty(rules)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Expr, OntologyClass};

    fn graph() -> OntologyGraph {
        let mut graph = OntologyGraph::default();
        graph.insert(OntologyClass {
            id: "root".to_string(),
            label: "root".to_string(),
            ..Default::default()
        });
        graph.insert(OntologyClass {
            id: "bucket_1".to_string(),
            label: "bucket one".to_string(),
            parents: vec!["root".to_string()],
            axiom: Some(Expr::SomeValuesFrom(Box::new(Expr::Class(
                "foodon_1".to_string(),
            )))),
            ..Default::default()
        });
        graph
    }

    #[test]
    fn test_cache_path_sanitizes_root() {
        let path = cache_path(Path::new("/tmp/foodon.owl"), "http://x/LEXMAPR_root");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "foodon.http___x_LEXMAPR_root.rules.json"
        );
    }

    #[test]
    fn test_compile_write_read_round_trip() {
        let dir = std::env::temp_dir().join("ontomap_cache_test");
        std::fs::create_dir_all(&dir).unwrap();
        let ontology = dir.join("mini.owl");
        fs::write(&ontology, "<!-- ontology stand-in -->").unwrap();

        let first = load_or_compile(&ontology, &graph(), "root", false).unwrap();
        assert_eq!(first.len(), 1);
        assert!(cache_path(&ontology, "root").exists());

        // second call must be served from the cache file
        let second = load_or_compile(&ontology, &graph(), "root", false).unwrap();
        assert_eq!(first, second);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_cache_skips_file() {
        let dir = std::env::temp_dir().join("ontomap_nocache_test");
        std::fs::create_dir_all(&dir).unwrap();
        let ontology = dir.join("mini.owl");
        fs::write(&ontology, "<!-- ontology stand-in -->").unwrap();

        let rules = load_or_compile(&ontology, &graph(), "root", true).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(!cache_path(&ontology, "root").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Ontomap: specimen description to ontology term mapping
//!
//! A toolkit for translating short free-text biomedical specimen
//! descriptions into standardized ontology term ids and agency reporting
//! buckets.

pub mod bucket; // Bucket schemes and parent-chain bucket lookup
pub mod cache; // On-disk cache for compiled bucket rules
pub mod compiler; // Axiom expression to rule tree lowering
pub mod component; // N-gram/combination component matching
pub mod config; // Ontology config JSON and resource profiles
pub mod error;
pub mod hierarchy; // Parent DAG and root-ward chain enumeration
pub mod lexicon; // Key/value dictionary tables
pub mod mapper; // Full-phrase term mapping strategies
pub mod normalize; // Deterministic cleaning pipeline
pub mod ontology; // Fetched-ontology contract model
pub mod pipeline; // Per-sample classification driver
pub mod refine; // IFSAC label refinement rules
pub mod resource; // Label/id table with permutation indices
pub mod rules; // Rule trees and the set-valued evaluator
pub mod samples; // Sample CSV reading and TSV record writing
pub mod status; // Provenance tags

// Re-exports for convenience
pub use component::{match_components, ComponentMatch, ComponentResult};
pub use error::MapError;
pub use hierarchy::ParentIndex;
pub use lexicon::Lexicon;
pub use mapper::{map_term, Mapping};
pub use normalize::{normalize, CleanedSample};
pub use pipeline::{ClassificationResult, Engine};
pub use resource::ResourceTable;
pub use rules::{evaluate, Evidence, RuleTree};
pub use samples::{OutputFormat, Record, RecordWriter, Sample, SampleReader};
pub use status::{MacroStatus, Status};

//! Command-line front end for the ontomap pipeline.

use clap::{Parser, ValueEnum};
use ontomap::cache::load_or_compile;
use ontomap::config::{load_ontology_config, Profile};
use ontomap::error::MapError;
use ontomap::ontology::OntologyGraph;
use ontomap::pipeline::Engine;
use ontomap::samples::{OutputFormat, RecordWriter, SampleReader};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Full,
    Compact,
}

/// Map specimen descriptions to ontology terms and reporting buckets.
#[derive(Debug, Parser)]
#[command(name = "ontomap", version)]
struct Args {
    /// Input sample CSV (plain or .gz)
    input_file: PathBuf,

    /// Output TSV path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output verbosity
    #[arg(short, long, value_enum, default_value_t = Format::Compact)]
    format: Format,

    /// Directory holding the resource tables to load
    #[arg(short, long)]
    profile: PathBuf,

    /// Emit bucket classification columns
    #[arg(short, long)]
    bucket: bool,

    /// Recompile ontology rules, ignoring any cache files
    #[arg(long)]
    no_cache: bool,

    /// Config JSON listing ontology snapshots and optional root IRIs
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ontomap: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), MapError> {
    let profile = Profile::new(&args.profile);
    let mut engine = Engine::load(&profile)?;

    if args.bucket {
        if let Some(config_path) = &args.config {
            let rules = load_rules(config_path, args.no_cache)?;
            engine = engine.with_rules(rules);
        }
        if engine.rules.is_empty() && engine.lexmapr_scheme.is_empty() {
            return Err(MapError::Input(
                "bucket mode needs bucket scheme tables in the profile or a --config \
                 with ontology rules"
                    .to_string(),
            ));
        }
    }

    let format = match args.format {
        Format::Full => OutputFormat::Full,
        Format::Compact => OutputFormat::Compact,
    };

    let reader = SampleReader::from_file(&args.input_file)?;
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = RecordWriter::new(sink, format, args.bucket)?;

    for sample in reader {
        let sample = sample?;
        let record = engine.classify_record(&sample);
        writer.write(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load each configured ontology snapshot and compile (or read cached)
/// bucket rules. A failing ontology is skipped with a warning as long as
/// another one loads; if every configured ontology fails, that is fatal.
fn load_rules(
    config_path: &Path,
    no_cache: bool,
) -> Result<FxHashMap<String, ontomap::rules::RuleTree>, MapError> {
    let entries = load_ontology_config(config_path)?;
    let mut merged = FxHashMap::default();
    let mut loaded = 0usize;

    for (iri, root) in &entries {
        let path = Path::new(iri);
        match load_graph(path) {
            Ok(graph) => {
                merged.extend(load_or_compile(path, &graph, root, no_cache)?);
                loaded += 1;
            }
            Err(e) => warn!(ontology = %iri, error = %e, "skipping ontology"),
        }
    }

    if loaded == 0 && !entries.is_empty() {
        return Err(MapError::OntologyLoad(
            "no configured ontology could be loaded".to_string(),
        ));
    }
    Ok(merged)
}

/// Read a fetched-ontology JSON snapshot.
fn load_graph(path: &Path) -> Result<OntologyGraph, MapError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MapError::OntologyLoad(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| {
        MapError::OntologyLoad(format!("{}: invalid ontology snapshot: {e}", path.display()))
    })
}

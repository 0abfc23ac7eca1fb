//! docpolicy command line
//!
//! Classifies a document file against a collection sequence of an
//! environment file and checks stored evaluation metadata.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docpolicy_core::{CollectionSequenceId, Document, InMemorySnapshot};
use docpolicy_sdk::{ConditionEngine, ConditionEngineBuilder, EngineConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (defaults to config/docpolicy and DOCPOLICY__* variables)
    #[arg(short, long, env = "DOCPOLICY_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a document and print the result as JSON
    Classify {
        /// Environment snapshot (.json, .yaml or .yml)
        #[arg(short, long)]
        environment: PathBuf,

        /// Collection sequence id
        #[arg(short, long)]
        sequence: CollectionSequenceId,

        /// Document (.json, .yaml or .yml)
        #[arg(short, long)]
        document: PathBuf,

        /// Write the document with its evaluation metadata to this file
        #[arg(short, long)]
        annotate: Option<PathBuf>,
    },

    /// Check the evaluation metadata stored on a document
    Verify {
        #[arg(short, long)]
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let engine = build_engine(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            environment,
            sequence,
            document,
            annotate,
        } => classify(&engine, &environment, sequence, &document, annotate.as_deref()),
        Commands::Verify { document } => verify(&engine, &document),
    }
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docpolicy_sdk=info,docpolicy_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn build_engine(config_path: Option<&Path>) -> Result<ConditionEngine> {
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::load()?,
    };
    Ok(ConditionEngineBuilder::new().with_config(config).build()?)
}

fn classify(
    engine: &ConditionEngine,
    environment: &Path,
    sequence_id: CollectionSequenceId,
    document_path: &Path,
    annotate: Option<&Path>,
) -> Result<()> {
    let snapshot = InMemorySnapshot::from_path(environment)
        .with_context(|| format!("Failed to load environment {}", environment.display()))?;
    let mut document = load_document(document_path)?;

    let result = match annotate {
        Some(output) => {
            let result = engine.classify_and_annotate(&snapshot, sequence_id, &mut document)?;
            fs::write(output, serde_json::to_string_pretty(&document)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Annotated document written to {}", output.display());
            result
        }
        None => engine.classify(&snapshot, sequence_id, &document)?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn verify(engine: &ConditionEngine, document_path: &Path) -> Result<()> {
    let document = load_document(document_path)?;

    match engine.stored_result(&document) {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => anyhow::bail!(
            "Document '{}' has no valid evaluation metadata",
            document.reference
        ),
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;

    let document = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(document)
}

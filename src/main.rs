//! phi CLI - build leaves, roots and inclusion proofs from the command line
//!
//! Every command prints a single JSON document (or its pretty form with
//! `--format text`), so the binary can be wrapped by other tooling.

use clap::{Parser, Subcommand};
use phi_merkle::{EntangledDataObject, Hash, InclusionProof, PhiConfig, PhiMerkleTree};
use serde::Deserialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phi")]
#[command(about = "Variable-branching Merkle trees over entangled data objects")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Path to a JSON config file (hash algorithm, canonical style, tolerance, max fan-out)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one entangled data object and print its leaf digest
    Leaf {
        /// Digital state as a JSON document
        #[arg(long)]
        digital: String,
        /// Physical state as a JSON document
        #[arg(long)]
        physical: String,
    },

    /// Fold hex leaf digests into a root
    Root {
        /// Leaf digests in order
        leaves: Vec<String>,
    },

    /// Build leaves from a JSON file of {"digital", "physical"} pairs, then the root
    Build {
        /// Path to the JSON array
        file: PathBuf,
    },

    /// Produce an inclusion proof for one leaf
    Prove {
        /// Index of the leaf to prove
        index: usize,
        /// Leaf digests in order
        leaves: Vec<String>,
    },

    /// Check an inclusion proof
    Verify {
        /// Path to a proof as printed by `prove`
        #[arg(long)]
        proof: PathBuf,
        /// The leaf digest being proven
        #[arg(long)]
        leaf: String,
        /// The expected root
        #[arg(long)]
        root: String,
    },

    /// Show the branching factor chosen for a level of `nodes` nodes
    Branching {
        /// Number of nodes at the level
        nodes: usize,
    },
}

#[derive(Deserialize)]
struct LeafInput {
    digital: serde_json::Value,
    physical: serde_json::Value,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => PhiConfig::load(path)?,
        None => PhiConfig::default(),
    };
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Leaf { digital, physical } => {
            let digital: serde_json::Value = serde_json::from_str(&digital)?;
            let physical: serde_json::Value = serde_json::from_str(&physical)?;
            let edo = EntangledDataObject::with_config(&digital, &physical, &config)?;
            output(
                cli.format,
                &serde_json::json!({
                    "digest": edo.leaf_data().to_hex(),
                    "coherent": edo.coherence_flag()
                }),
            )?;
        }

        Commands::Root { leaves } => {
            let tree = PhiMerkleTree::from_hex(&leaves, &config)?;
            output(
                cli.format,
                &serde_json::json!({
                    "root": tree.root().to_hex(),
                    "leaves": tree.len(),
                    "branching_factors": tree.branching_factors()
                }),
            )?;
        }

        Commands::Build { file } => {
            let content = std::fs::read_to_string(&file)?;
            let inputs: Vec<LeafInput> = serde_json::from_str(&content)?;
            let edos = inputs
                .iter()
                .map(|i| EntangledDataObject::with_config(&i.digital, &i.physical, &config))
                .collect::<phi_merkle::Result<Vec<_>>>()?;
            let tree = PhiMerkleTree::from_edos(&edos, &config)?;

            let leaves: Vec<_> = edos
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "digest": e.leaf_data().to_hex(),
                        "coherent": e.coherence_flag()
                    })
                })
                .collect();
            output(
                cli.format,
                &serde_json::json!({
                    "root": tree.root().to_hex(),
                    "leaves": leaves,
                    "branching_factors": tree.branching_factors()
                }),
            )?;
        }

        Commands::Prove { index, leaves } => {
            let tree = PhiMerkleTree::from_hex(&leaves, &config)?;
            let proof = tree.prove(index)?;
            output(
                cli.format,
                &serde_json::json!({
                    "root": tree.root().to_hex(),
                    "leaf": tree.leaves()[index].to_hex(),
                    "proof": proof
                }),
            )?;
        }

        Commands::Verify { proof, leaf, root } => {
            let content = std::fs::read_to_string(&proof)?;
            let proof = parse_proof(&content)?;
            let leaf: Hash = leaf.parse()?;
            let root: Hash = root.parse()?;
            let valid = proof.verify_with_config(&leaf, &root, &config)?;
            output(cli.format, &serde_json::json!({ "valid": valid }))?;
            if !valid {
                std::process::exit(1);
            }
        }

        Commands::Branching { nodes } => {
            let table = config.branching_table()?;
            output(
                cli.format,
                &serde_json::json!({
                    "nodes": nodes,
                    "branching_factor": table.select(nodes),
                    "candidates": table.factors()
                }),
            )?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Accepts either the full `prove` output or just its `proof` object
fn parse_proof(content: &str) -> anyhow::Result<InclusionProof> {
    let mut value: serde_json::Value = serde_json::from_str(content)?;
    let proof = value
        .as_object_mut()
        .and_then(|m| m.remove("proof"))
        .unwrap_or(value);
    Ok(serde_json::from_value(proof)?)
}

fn output(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

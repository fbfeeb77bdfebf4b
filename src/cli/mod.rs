//! Command-line interface for phyto-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Find plants from a region whose chemicals resemble drugs for a disease
//! - **similarity**: Score the similarity of two structures
//! - **tables**: Inspect the drug and plant tables
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Plants from Europe related to drugs for soft tissue pain
//! phyto-match match --disease M79 --region Europe
//!
//! # Use your own tables and a stricter threshold
//! phyto-match match --disease E11 --region India --drugs drugs.csv --plants plants.csv.gz --threshold 0.5
//!
//! # JSON output for scripting
//! phyto-match match --disease M79 --region Europe --format json
//!
//! # Similarity of aspirin and salicylic acid
//! phyto-match similarity 'CC(=O)Oc1ccccc1C(=O)O' 'OC(=O)c1ccccc1O'
//!
//! # Start web UI
//! phyto-match serve --port 8080 --open
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::{load_drug_table, load_plant_table, DrugTable, PlantTable};
use crate::matching::engine::DEFAULT_SIMILARITY_THRESHOLD;

pub mod compare;
pub mod find;
pub mod tables;

#[derive(Parser)]
#[command(name = "phyto-match")]
#[command(version)]
#[command(about = "Find plants with chemicals similar to the drugs used for a disease")]
#[command(
    long_about = "phyto-match looks up the drugs indicated for a disease (by ICD-10 code) and searches the plants of a region for chemicals with similar structures.\n\nStructures are compared by the Tanimoto similarity of their Morgan fingerprints (radius 2, 2048 bits). A plant is reported when any of its chemicals reaches the similarity threshold against any of the drugs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find plants matching a disease and region
    Match(find::MatchArgs),

    /// Compute the similarity of two structures
    Similarity(compare::SimilarityArgs),

    /// Inspect the drug and plant tables
    Tables(tables::TablesArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Table sources shared by the commands that read tables
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Drug table (.csv or .csv.gz); defaults to the embedded table
    #[arg(long)]
    pub drugs: Option<PathBuf>,

    /// Plant table (.csv or .csv.gz); defaults to the embedded table
    #[arg(long)]
    pub plants: Option<PathBuf>,
}

impl TableArgs {
    /// Load both tables, falling back to the embedded ones
    ///
    /// # Errors
    ///
    /// Returns an error naming the path if a table cannot be loaded.
    pub fn load(&self) -> anyhow::Result<(DrugTable, PlantTable)> {
        let drugs = match &self.drugs {
            Some(path) => load_drug_table(path)
                .with_context(|| format!("Failed to load drug table {}", path.display()))?,
            None => DrugTable::load_embedded().context("Failed to load embedded drug table")?,
        };
        let plants = match &self.plants {
            Some(path) => load_plant_table(path)
                .with_context(|| format!("Failed to load plant table {}", path.display()))?,
            None => PlantTable::load_embedded().context("Failed to load embedded plant table")?,
        };
        Ok((drugs, plants))
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Minimum Tanimoto similarity for a match (0 to 1)
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    #[command(flatten)]
    pub tables: TableArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

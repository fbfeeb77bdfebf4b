//! # phyto-match
//!
//! A library for finding plants whose chemicals resemble the drugs used to treat a disease.
//!
//! Given a disease (as an ICD-10 code or code prefix) and a geographic region,
//! `phyto-match` looks up the drugs indicated for that disease, then searches the
//! plants native to the region for chemicals structurally similar to those drugs.
//! Structures are compared by the Tanimoto similarity of their circular (Morgan)
//! fingerprints.
//!
//! ## Features
//!
//! - **SMILES parsing**: Organic subset, bracket atoms, rings, branches and aromaticity
//! - **Morgan fingerprints**: Deterministic 2048-bit ECFP4-style fingerprints
//! - **Tanimoto similarity**: Configurable acceptance threshold
//! - **Tolerant matching**: Unparsable structures are skipped, never fatal
//! - **CSV tables**: Plain or gzip-compressed, with flexible column headers
//!
//! ## Example
//!
//! ```rust,no_run
//! use phyto_match::{find_plants_for_disease, DrugTable, PlantTable};
//!
//! // Load the embedded demonstration tables
//! let drugs = DrugTable::load_embedded().unwrap();
//! let plants = PlantTable::load_embedded().unwrap();
//!
//! // Plants from Europe with chemicals similar to drugs for soft tissue pain (M79)
//! let found = find_plants_for_disease(&drugs, &plants, "M79", "Europe").unwrap();
//!
//! for plant in found {
//!     println!("{plant}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Drug and plant tables and their resolvers
//! - [`core`]: Core data types for records, elements and molecules
//! - [`matching`]: Fingerprints, similarity and the matching engine
//! - [`parsing`]: Parsers for SMILES strings and CSV tables
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based matching

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::{load_drug_table, load_plant_table, DrugTable, PlantTable};
pub use core::molecule::Molecule;
pub use core::types::*;
pub use matching::engine::{
    find_plants_for_disease, MatchQuery, MatchResult, MatchStats, MatchingConfig, MatchingEngine,
};
pub use matching::fingerprint::{morgan_fingerprint, Fingerprint, FingerprintParams};
pub use matching::scoring::tanimoto_similarity;
pub use parsing::smiles::{parse_smiles, parse_structure};

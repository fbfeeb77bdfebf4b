//! Plant matching engine and similarity scoring.
//!
//! This module provides the core matching functionality:
//!
//! - [`fingerprint`]: Circular (Morgan) fingerprints of molecules
//! - [`scoring`]: Tanimoto similarity between fingerprints
//! - [`engine::MatchingEngine`]: Main entry point for finding plants for a disease
//!
//! ## Matching Algorithm
//!
//! 1. **Disease resolution**: Drugs whose ICD-10 code contains the query code
//! 2. **Drug fingerprints**: Each distinct drug chemical is parsed and fingerprinted once
//! 3. **Region resolution**: Plant chemicals whose country of origin contains the query region
//! 4. **Comparison**: A plant matches as soon as one of its chemicals reaches the
//!    similarity threshold against any drug chemical
//!
//! Structures that fail to parse are skipped with a warning and never fail the run.
//!
//! ## Example
//!
//! ```rust,no_run
//! use phyto_match::{DrugTable, MatchQuery, MatchingConfig, MatchingEngine, PlantTable};
//!
//! let drugs = DrugTable::load_embedded().unwrap();
//! let plants = PlantTable::load_embedded().unwrap();
//!
//! let config = MatchingConfig::with_threshold(0.4).unwrap();
//! let engine = MatchingEngine::with_config(&drugs, &plants, config);
//! let query = MatchQuery::new("M79", "Europe").unwrap();
//!
//! let result = engine.find_matches(&query);
//! for plant in &result.plants {
//!     println!("{plant}");
//! }
//! ```

pub mod engine;
pub mod fingerprint;
pub mod scoring;

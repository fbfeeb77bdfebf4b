//! Core data types for plant–disease matching.
//!
//! - [`DrugRecord`], [`PlantRecord`]: rows of the two input tables
//! - [`DrugChemical`]: a distinct (drug name, structure) pair resolved for a disease
//! - [`Molecule`]: molecular graph parsed from a SMILES structure string
//! - [`element`]: element symbols and organic-subset valences used by the parser
//!
//! [`DrugRecord`]: types::DrugRecord
//! [`PlantRecord`]: types::PlantRecord
//! [`DrugChemical`]: types::DrugChemical
//! [`Molecule`]: molecule::Molecule

pub mod element;
pub mod molecule;
pub mod types;

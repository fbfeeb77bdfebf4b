//! Drug and plant tables and the resolvers that query them.
//!
//! The drug table associates drugs with ICD-10 disease codes and the chemical
//! structure of their active ingredient. The plant table associates plants with
//! their country of origin and the structures of chemicals they contain. A small
//! demonstration dataset is embedded in the binary, and full tables can be
//! loaded from CSV files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use phyto_match::catalog::lookup::{resolve_disease_chemicals, resolve_region_plants};
//! use phyto_match::{DrugTable, PlantTable};
//!
//! let drugs = DrugTable::load_embedded().unwrap();
//! let plants = PlantTable::load_embedded().unwrap();
//!
//! for chemical in resolve_disease_chemicals(&drugs, "M79") {
//!     println!("{}\t{}", chemical.drug_name, chemical.structure);
//! }
//!
//! let european = resolve_region_plants(&plants, "Europe");
//! println!("{} European plant chemicals", european.len());
//! ```

pub mod lookup;
pub mod store;

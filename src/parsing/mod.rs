//! Parsers for chemical structures and the drug and plant tables.
//!
//! This module provides parsers for:
//!
//! - **SMILES strings**: Build a molecular graph from a structure string
//! - **CSV tables**: Read drug and plant records from `.csv` or `.csv.gz` files
//!
//! ## Example
//!
//! ```rust,no_run
//! use phyto_match::parsing::csv::{open_table, read_plant_records};
//! use phyto_match::parsing::smiles::parse_smiles;
//! use std::path::Path;
//!
//! // Parse a structure
//! let aspirin = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
//! assert_eq!(aspirin.atom_count(), 13);
//!
//! // Read a plant table
//! let plants = read_plant_records(open_table(Path::new("plants.csv.gz")).unwrap()).unwrap();
//! ```
//!
//! ## Table Columns
//!
//! Headers are matched case-insensitively; extra columns are ignored.
//!
//! | Table | Column | Accepted headers |
//! |-------|--------|------------------|
//! | drug  | drug name | `Drug Name`, `Drug_Name`, `drug_name` |
//! | drug  | ICD-10 code | `ICD-10 Code`, `ICD10_Code`, `icd10_code` |
//! | plant | plant name | `Plant Name`, `Plant`, `plant_name` |
//! | plant | country | `Country of Origin`, `Country_of_Origin`, `country_of_origin` |
//! | both  | structure | `SMILES`, `structure` |

pub mod csv;
pub mod smiles;

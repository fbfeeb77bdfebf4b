use std::path::Path;

use tracing::debug;

use crate::core::types::{DrugRecord, PlantRecord};
use crate::parsing::csv::{open_table, read_drug_records, read_plant_records, TableError};

/// Drug–chemical associations, loaded once and never mutated
#[derive(Debug, Clone, Default)]
pub struct DrugTable {
    records: Vec<DrugRecord>,
}

impl DrugTable {
    #[must_use]
    pub fn from_records(records: Vec<DrugRecord>) -> Self {
        Self { records }
    }

    /// Load the embedded demonstration table
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the embedded table is malformed.
    pub fn load_embedded() -> Result<Self, TableError> {
        // Validated at compile time via build.rs
        const EMBEDDED_DRUGS: &str = include_str!("../../data/drug_chemicals.csv");
        Self::from_csv(EMBEDDED_DRUGS)
    }

    /// Load a table from a `.csv` or `.csv.gz` file
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the file cannot be read or is malformed.
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let records = read_drug_records(open_table(path)?)?;
        debug!("Loaded {} drug records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    /// Parse a table from CSV text
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the text is malformed.
    pub fn from_csv(csv: &str) -> Result<Self, TableError> {
        Ok(Self::from_records(read_drug_records(csv.as_bytes())?))
    }

    #[must_use]
    pub fn records(&self) -> &[DrugRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Plant–chemical associations, loaded once and never mutated
#[derive(Debug, Clone, Default)]
pub struct PlantTable {
    records: Vec<PlantRecord>,
}

impl PlantTable {
    #[must_use]
    pub fn from_records(records: Vec<PlantRecord>) -> Self {
        Self { records }
    }

    /// Load the embedded demonstration table
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the embedded table is malformed.
    pub fn load_embedded() -> Result<Self, TableError> {
        const EMBEDDED_PLANTS: &str = include_str!("../../data/plant_chemicals.csv");
        Self::from_csv(EMBEDDED_PLANTS)
    }

    /// Load a table from a `.csv` or `.csv.gz` file
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the file cannot be read or is malformed.
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let records = read_plant_records(open_table(path)?)?;
        debug!("Loaded {} plant records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    /// Parse a table from CSV text
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the text is malformed.
    pub fn from_csv(csv: &str) -> Result<Self, TableError> {
        Ok(Self::from_records(read_plant_records(csv.as_bytes())?))
    }

    #[must_use]
    pub fn records(&self) -> &[PlantRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the drug table from `path`
///
/// # Errors
///
/// Returns `TableError` if the file cannot be read, lacks a required column,
/// or exceeds the row limit.
pub fn load_drug_table(path: &Path) -> Result<DrugTable, TableError> {
    DrugTable::load_from_file(path)
}

/// Load the plant table from `path`
///
/// # Errors
///
/// Returns `TableError` if the file cannot be read, lacks a required column,
/// or exceeds the row limit.
pub fn load_plant_table(path: &Path) -> Result<PlantTable, TableError> {
    PlantTable::load_from_file(path)
}

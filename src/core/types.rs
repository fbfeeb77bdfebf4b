use serde::{Deserialize, Serialize};

/// One drug–chemical association from the drug table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    pub drug_name: String,
    pub icd10_code: String,
    /// SMILES structure string; may be empty when the source cell was missing
    pub structure: String,
}

impl DrugRecord {
    pub fn new(
        drug_name: impl Into<String>,
        icd10_code: impl Into<String>,
        structure: impl Into<String>,
    ) -> Self {
        Self {
            drug_name: drug_name.into(),
            icd10_code: icd10_code.into(),
            structure: structure.into(),
        }
    }
}

/// One plant–chemical association from the plant table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub plant_name: String,
    pub country_of_origin: String,
    /// SMILES structure string; may be empty when the source cell was missing
    pub structure: String,
}

impl PlantRecord {
    pub fn new(
        plant_name: impl Into<String>,
        country_of_origin: impl Into<String>,
        structure: impl Into<String>,
    ) -> Self {
        Self {
            plant_name: plant_name.into(),
            country_of_origin: country_of_origin.into(),
            structure: structure.into(),
        }
    }
}

/// A distinct (drug name, structure) pair indicated for a disease
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrugChemical {
    pub drug_name: String,
    pub structure: String,
}

impl From<&DrugRecord> for DrugChemical {
    fn from(record: &DrugRecord) -> Self {
        Self {
            drug_name: record.drug_name.clone(),
            structure: record.structure.clone(),
        }
    }
}

//! Disease and region resolvers.
//!
//! Both resolvers use case-insensitive substring matching, so a query of `M79`
//! matches `M79.3` and `europe` matches `Eastern Europe`. A row whose cell is
//! empty never matches. An empty query matches every other row; callers reject
//! blank queries before reaching here.

use std::collections::HashSet;

use tracing::debug;

use super::store::{DrugTable, PlantTable};
use crate::core::types::{DrugChemical, PlantRecord};

/// Empty cells are missing values and match nothing
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle_lower)
}

/// Distinct `(drug_name, structure)` pairs whose ICD-10 code contains `disease_code`.
///
/// Pairs are returned in the order they are first seen in the table.
#[must_use]
pub fn resolve_disease_chemicals(drugs: &DrugTable, disease_code: &str) -> Vec<DrugChemical> {
    let needle = disease_code.to_lowercase();
    let mut seen = HashSet::new();
    let chemicals: Vec<DrugChemical> = drugs
        .records()
        .iter()
        .filter(|record| contains_ignore_case(&record.icd10_code, &needle))
        .map(DrugChemical::from)
        .filter(|chemical| seen.insert(chemical.clone()))
        .collect();

    debug!(
        "Disease '{}' resolved to {} drug chemicals",
        disease_code,
        chemicals.len()
    );
    chemicals
}

/// Plant records whose country of origin contains `region`, in table order.
#[must_use]
pub fn resolve_region_plants<'a>(plants: &'a PlantTable, region: &str) -> Vec<&'a PlantRecord> {
    let needle = region.to_lowercase();
    let records: Vec<&PlantRecord> = plants
        .records()
        .iter()
        .filter(|record| contains_ignore_case(&record.country_of_origin, &needle))
        .collect();

    debug!("Region '{}' resolved to {} plant records", region, records.len());
    records
}

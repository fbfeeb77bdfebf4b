use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::lookup::{resolve_disease_chemicals, resolve_region_plants};
use crate::catalog::store::{DrugTable, PlantTable};
use crate::matching::fingerprint::{morgan_fingerprint, Fingerprint, FingerprintParams};
use crate::matching::scoring::tanimoto_similarity;
use crate::parsing::smiles::parse_structure;
use crate::utils::validation::{validate_query_field, validate_threshold, ValidationError};

/// Default minimum Tanimoto similarity for a plant chemical to match a drug chemical
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Configuration for the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchingConfig {
    /// Minimum similarity (inclusive) for a drug/plant pairing to count
    pub similarity_threshold: f64,
    /// Fingerprint parameters shared by drug and plant chemicals
    pub fingerprint: FingerprintParams,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            fingerprint: FingerprintParams::default(),
        }
    }
}

impl MatchingConfig {
    /// Default configuration with a custom similarity threshold
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ThresholdOutOfRange` if the threshold is outside `[0, 1]`.
    pub fn with_threshold(threshold: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            similarity_threshold: validate_threshold(threshold)?,
            ..Self::default()
        })
    }
}

/// A validated query: disease code and region, both trimmed and non-blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchQuery {
    pub disease: String,
    pub region: String,
}

impl MatchQuery {
    /// # Errors
    ///
    /// Returns `ValidationError` if either field is blank, too long, or
    /// contains control characters.
    pub fn new(disease: &str, region: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            disease: validate_query_field("disease", disease)?,
            region: validate_query_field("region", region)?,
        })
    }
}

/// Counters describing one matching run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Distinct drug chemicals indicated for the disease
    pub drug_chemicals: usize,
    /// Drug chemicals whose structure parsed
    pub drug_fingerprints: usize,
    /// Plant records from the region
    pub regional_plants: usize,
    /// Structures (drug or plant) that failed to parse
    pub parse_failures: usize,
    /// Similarity computations performed
    pub comparisons: usize,
}

/// Plants matching a query
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchResult {
    /// Names of matching plants, deduplicated and sorted
    pub plants: BTreeSet<String>,
    pub stats: MatchStats,
}

impl MatchResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

/// The main matching engine
pub struct MatchingEngine<'a> {
    drugs: &'a DrugTable,
    plants: &'a PlantTable,
    config: MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    #[must_use]
    pub fn new(drugs: &'a DrugTable, plants: &'a PlantTable) -> Self {
        Self::with_config(drugs, plants, MatchingConfig::default())
    }

    /// Create a new matching engine with custom configuration
    #[must_use]
    pub fn with_config(drugs: &'a DrugTable, plants: &'a PlantTable, config: MatchingConfig) -> Self {
        Self {
            drugs,
            plants,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Find plants from the query region containing a chemical similar to a
    /// drug indicated for the query disease.
    ///
    /// A plant matches as soon as one of its chemicals reaches the threshold
    /// against any drug chemical. Structures that fail to parse are skipped.
    #[must_use]
    pub fn find_matches(&self, query: &MatchQuery) -> MatchResult {
        let mut result = MatchResult::default();

        // Step 1: Fingerprint the drug chemicals for the disease
        let chemicals = resolve_disease_chemicals(self.drugs, &query.disease);
        result.stats.drug_chemicals = chemicals.len();

        let drug_fingerprints: Vec<Fingerprint> = chemicals
            .iter()
            .filter_map(|chemical| {
                let fp = self.fingerprint(&chemical.structure);
                if fp.is_none() {
                    result.stats.parse_failures += 1;
                }
                fp
            })
            .collect();
        result.stats.drug_fingerprints = drug_fingerprints.len();

        if drug_fingerprints.is_empty() {
            info!(
                "No usable drug chemicals for disease '{}'; no plant can match",
                query.disease
            );
            return result;
        }

        // Step 2: Compare each regional plant chemical against the drug fingerprints
        let regional = resolve_region_plants(self.plants, &query.region);
        result.stats.regional_plants = regional.len();

        for record in regional {
            // membership cannot change once a plant is accepted
            if result.plants.contains(&record.plant_name) {
                continue;
            }

            let Some(plant_fp) = self.fingerprint(&record.structure) else {
                result.stats.parse_failures += 1;
                continue;
            };

            for drug_fp in &drug_fingerprints {
                result.stats.comparisons += 1;
                let similarity = tanimoto_similarity(drug_fp, &plant_fp);
                if similarity >= self.config.similarity_threshold {
                    debug!(
                        "{} matched with similarity {:.3}",
                        record.plant_name, similarity
                    );
                    result.plants.insert(record.plant_name.clone());
                    break;
                }
            }
        }

        info!(
            "Found {} matching plants for disease '{}' in region '{}'",
            result.plants.len(),
            query.disease,
            query.region
        );
        result
    }

    fn fingerprint(&self, structure: &str) -> Option<Fingerprint> {
        parse_structure(structure).map(|mol| morgan_fingerprint(&mol, self.config.fingerprint))
    }
}

/// Match with the default configuration in one call
///
/// # Errors
///
/// Returns `ValidationError` if the disease or region is blank or malformed.
pub fn find_plants_for_disease(
    drugs: &DrugTable,
    plants: &PlantTable,
    disease: &str,
    region: &str,
) -> Result<BTreeSet<String>, ValidationError> {
    let query = MatchQuery::new(disease, region)?;
    Ok(MatchingEngine::new(drugs, plants).find_matches(&query).plants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DrugRecord, PlantRecord};

    const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";

    fn drugs() -> DrugTable {
        DrugTable::from_records(vec![DrugRecord::new("Aspirin", "M79.3", ASPIRIN)])
    }

    fn plants(records: &[(&str, &str, &str)]) -> PlantTable {
        PlantTable::from_records(
            records
                .iter()
                .map(|(name, country, smiles)| PlantRecord::new(*name, *country, *smiles))
                .collect(),
        )
    }

    fn run(drugs: &DrugTable, plants: &PlantTable, disease: &str, region: &str, threshold: f64) -> MatchResult {
        let config = MatchingConfig::with_threshold(threshold).unwrap();
        let query = MatchQuery::new(disease, region).unwrap();
        MatchingEngine::with_config(drugs, plants, config).find_matches(&query)
    }

    fn names(result: &MatchResult) -> Vec<&str> {
        result.plants.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_identical_structure_matches() {
        let plants = plants(&[("Willow", "Europe", ASPIRIN)]);
        let result = run(&drugs(), &plants, "M79", "Europe", 0.3);
        assert_eq!(names(&result), vec!["Willow"]);
        assert_eq!(result.stats.drug_chemicals, 1);
        assert_eq!(result.stats.comparisons, 1);
    }

    #[test]
    fn test_unknown_disease_is_empty() {
        let plants = plants(&[("Willow", "Europe", ASPIRIN)]);
        let result = run(&drugs(), &plants, "Z99", "Europe", 0.3);
        assert!(result.is_empty());
        assert_eq!(result.stats.drug_chemicals, 0);
        // plants are never examined without drug fingerprints
        assert_eq!(result.stats.regional_plants, 0);
    }

    #[test]
    fn test_unknown_region_is_empty() {
        let plants = plants(&[("Willow", "Europe", ASPIRIN)]);
        assert!(run(&drugs(), &plants, "M79", "Asia", 0.0).is_empty());
    }

    #[test]
    fn test_invalid_plant_structure_is_skipped() {
        let plants = plants(&[
            ("Mystery", "Europe", "not_a_smiles"),
            ("Blank", "Europe", ""),
            ("Willow", "Europe", ASPIRIN),
        ]);
        let result = run(&drugs(), &plants, "M79", "Europe", 0.3);
        assert_eq!(names(&result), vec!["Willow"]);
        assert_eq!(result.stats.parse_failures, 2);
    }

    #[test]
    fn test_invalid_drug_structure_is_skipped() {
        let drugs = DrugTable::from_records(vec![
            DrugRecord::new("Broken", "M79.3", "C1CC"),
            DrugRecord::new("Aspirin", "M79.3", ASPIRIN),
        ]);
        let plants = plants(&[("Willow", "Europe", ASPIRIN)]);
        let result = run(&drugs, &plants, "M79", "Europe", 0.3);
        assert_eq!(names(&result), vec!["Willow"]);
        assert_eq!(result.stats.drug_chemicals, 2);
        assert_eq!(result.stats.drug_fingerprints, 1);
        assert_eq!(result.stats.parse_failures, 1);
    }

    #[test]
    fn test_no_valid_drug_fingerprints() {
        let drugs = DrugTable::from_records(vec![DrugRecord::new("Broken", "M79.3", "not_a_smiles")]);
        let plants = plants(&[("Willow", "Europe", ASPIRIN)]);
        let result = run(&drugs, &plants, "M79", "Europe", 0.0);
        assert!(result.is_empty());
        assert_eq!(result.stats.comparisons, 0);
    }

    #[test]
    fn test_threshold_zero_includes_every_parsable_plant() {
        let plants = plants(&[
            ("Willow", "Europe", ASPIRIN),
            ("Nettle", "Europe", "CCCCCCCC"),
            ("Sorrel", "Europe", "OC(=O)C(=O)O"),
            ("Mystery", "Europe", "not_a_smiles"),
        ]);
        let result = run(&drugs(), &plants, "M79", "Europe", 0.0);
        assert_eq!(names(&result), vec!["Nettle", "Sorrel", "Willow"]);
    }

    #[test]
    fn test_threshold_one_requires_identical_fingerprint() {
        let plants = plants(&[
            ("Willow", "Europe", "CC(=O)Oc1ccccc1C(=O)O"),
            ("Meadowsweet", "Europe", "COC(=O)c1ccccc1O"),
        ]);
        let result = run(&drugs(), &plants, "M79", "Europe", 1.0);
        assert_eq!(names(&result), vec!["Willow"]);
    }

    #[test]
    fn test_threshold_excludes_unrelated_plants() {
        let plants = plants(&[
            ("Willow", "Europe", ASPIRIN),
            ("Nettle", "Europe", "CCCCCCCC"),
        ]);
        let result = run(&drugs(), &plants, "M79", "Europe", 0.3);
        assert_eq!(names(&result), vec!["Willow"]);
    }

    #[test]
    fn test_duplicate_plant_names_reported_once() {
        let drugs = DrugTable::from_records(vec![
            DrugRecord::new("Aspirin", "M79.3", ASPIRIN),
            DrugRecord::new("Salicylic acid", "M79.1", "OC(=O)c1ccccc1O"),
        ]);
        let plants = plants(&[
            ("Willow", "Europe", ASPIRIN),
            ("Willow", "Europe", "OC(=O)c1ccccc1O"),
        ]);
        let result = run(&drugs, &plants, "M79", "Europe", 0.3);
        assert_eq!(names(&result), vec!["Willow"]);
        // second Willow row skipped after the first was accepted
        assert_eq!(result.stats.comparisons, 1);
    }

    #[test]
    fn test_empty_tables() {
        let result = run(&DrugTable::default(), &PlantTable::default(), "M79", "Europe", 0.3);
        assert!(result.is_empty());
        assert_eq!(result.stats, MatchStats::default());
    }

    #[test]
    fn test_query_validation() {
        assert!(MatchQuery::new("M79", "Europe").is_ok());
        assert_eq!(
            MatchQuery::new("  ", "Europe"),
            Err(ValidationError::BlankField("disease"))
        );
        assert_eq!(
            MatchQuery::new("M79", ""),
            Err(ValidationError::BlankField("region"))
        );
        assert_eq!(MatchQuery::new(" M79 ", "Europe").unwrap().disease, "M79");
    }

    #[test]
    fn test_threshold_validation() {
        assert!(MatchingConfig::with_threshold(0.5).is_ok());
        assert!(MatchingConfig::with_threshold(1.01).is_err());
        assert!(MatchingConfig::with_threshold(f64::NAN).is_err());
        assert_eq!(
            MatchingConfig::default().similarity_threshold,
            DEFAULT_SIMILARITY_THRESHOLD
        );
    }

    #[test]
    fn test_find_plants_for_disease() {
        let plants = plants(&[("Willow", "Europe", ASPIRIN), ("Cinchona", "Peru", ASPIRIN)]);
        let found = find_plants_for_disease(&drugs(), &plants, "m79", "europe").unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["Willow".to_string()]);
        assert!(find_plants_for_disease(&drugs(), &plants, "", "Europe").is_err());
    }

    #[test]
    fn test_embedded_tables() {
        let drugs = DrugTable::load_embedded().unwrap();
        let plants = PlantTable::load_embedded().unwrap();
        let found = find_plants_for_disease(&drugs, &plants, "B54", "Peru").unwrap();
        assert!(found.contains("Cinchona"));
    }
}

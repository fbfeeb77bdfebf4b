//! Reader for the drug and plant CSV tables.
//!
//! Supports both uncompressed and gzip compressed files (`.csv`, `.csv.gz`).
//! Headers are matched case-insensitively after trimming; extra columns are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::core::types::{DrugRecord, PlantRecord};
use crate::utils::validation::MAX_TABLE_ROWS;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}' (accepted headers: {accepted})")]
    MissingColumn {
        column: &'static str,
        accepted: String,
    },

    #[error("Too many rows: {rows} exceeds maximum allowed ({max})")]
    TooManyRows { rows: usize, max: usize },
}

/// A required column and the headers it may appear under
struct Column {
    name: &'static str,
    headers: &'static [&'static str],
}

const DRUG_NAME: Column = Column {
    name: "drug name",
    headers: &["Drug Name", "Drug_Name", "drug_name"],
};

const ICD10_CODE: Column = Column {
    name: "ICD-10 code",
    headers: &["ICD-10 Code", "ICD10_Code", "icd10_code"],
};

const PLANT_NAME: Column = Column {
    name: "plant name",
    headers: &["Plant Name", "Plant", "plant_name"],
};

const COUNTRY: Column = Column {
    name: "country of origin",
    headers: &["Country of Origin", "Country_of_Origin", "country_of_origin"],
};

const STRUCTURE: Column = Column {
    name: "structure",
    headers: &["SMILES", "structure"],
};

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Open a table file, transparently decompressing `.gz` files
///
/// # Errors
///
/// Returns `TableError::Io` if the file cannot be opened.
pub fn open_table(path: &Path) -> Result<Box<dyn Read>, TableError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read drug records from CSV with columns: drug name, ICD-10 code, SMILES
///
/// # Errors
///
/// Returns `TableError::MissingColumn` if a required header is absent,
/// `TableError::Csv` for malformed CSV, or `TableError::TooManyRows` if the
/// row limit is exceeded.
pub fn read_drug_records<R: Read>(reader: R) -> Result<Vec<DrugRecord>, TableError> {
    read_rows(
        reader,
        [&DRUG_NAME, &ICD10_CODE, &STRUCTURE],
        MAX_TABLE_ROWS,
        |[name, code, smiles]| DrugRecord::new(name, code, smiles),
    )
}

/// Read plant records from CSV with columns: plant name, country of origin, SMILES
///
/// # Errors
///
/// Returns `TableError::MissingColumn` if a required header is absent,
/// `TableError::Csv` for malformed CSV, or `TableError::TooManyRows` if the
/// row limit is exceeded.
pub fn read_plant_records<R: Read>(reader: R) -> Result<Vec<PlantRecord>, TableError> {
    read_rows(
        reader,
        [&PLANT_NAME, &COUNTRY, &STRUCTURE],
        MAX_TABLE_ROWS,
        |[name, country, smiles]| PlantRecord::new(name, country, smiles),
    )
}

fn read_rows<R: Read, T>(
    reader: R,
    columns: [&Column; 3],
    max_rows: usize,
    build: impl Fn([&str; 3]) -> T,
) -> Result<Vec<T>, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let indices = [
        locate(&headers, columns[0])?,
        locate(&headers, columns[1])?,
        locate(&headers, columns[2])?,
    ];

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        // Check row limit for DOS protection
        if rows.len() >= max_rows {
            return Err(TableError::TooManyRows {
                rows: rows.len() + 1,
                max: max_rows,
            });
        }

        // short rows leave trailing cells missing; missing cells read as empty
        let cell = |i: usize| record.get(indices[i]).unwrap_or("");
        rows.push(build([cell(0), cell(1), cell(2)]));
    }

    Ok(rows)
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn locate(headers: &StringRecord, column: &Column) -> Result<usize, TableError> {
    headers
        .iter()
        .position(|h| {
            let h = normalize_header(h);
            column.headers.iter().any(|accepted| accepted.to_lowercase() == h)
        })
        .ok_or_else(|| TableError::MissingColumn {
            column: column.name,
            accepted: column.headers.join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_drug_records() {
        let csv = "Drug Name,ICD-10 Code,SMILES\n\
                   Aspirin,M79.3,CC(=O)OC1=CC=CC=C1C(=O)O\n\
                   Metformin,E11,CN(C)C(=N)N=C(N)N\n";
        let drugs = read_drug_records(csv.as_bytes()).unwrap();
        assert_eq!(drugs.len(), 2);
        assert_eq!(drugs[0].drug_name, "Aspirin");
        assert_eq!(drugs[0].icd10_code, "M79.3");
        assert_eq!(drugs[1].structure, "CN(C)C(=N)N=C(N)N");
    }

    #[test]
    fn test_header_aliases_and_order() {
        let csv = "smiles , COUNTRY_OF_ORIGIN,Family,plant\n\
                   OC(=O)c1ccccc1O,Europe,Salicaceae,Willow\n";
        let plants = read_plant_records(csv.as_bytes()).unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].plant_name, "Willow");
        assert_eq!(plants[0].country_of_origin, "Europe");
        assert_eq!(plants[0].structure, "OC(=O)c1ccccc1O");
    }

    #[test]
    fn test_row_limit_reports_offending_row() {
        let csv = "Drug Name,ICD-10 Code,SMILES\n\
                   Aspirin,M79.3,CC(=O)Oc1ccccc1C(=O)O\n\
                   Ibuprofen,M79.1,CC(C)Cc1ccc(cc1)C(C)C(=O)O\n\
                   Metformin,E11,CN(C)C(=N)N=C(N)N\n";
        let build = |[name, code, smiles]: [&str; 3]| DrugRecord::new(name, code, smiles);

        let columns = [&DRUG_NAME, &ICD10_CODE, &STRUCTURE];
        assert_eq!(read_rows(csv.as_bytes(), columns, 3, build).unwrap().len(), 3);

        let err = read_rows(csv.as_bytes(), columns, 2, build).unwrap_err();
        assert!(matches!(err, TableError::TooManyRows { rows: 3, max: 2 }));
        assert_eq!(err.to_string(), "Too many rows: 3 exceeds maximum allowed (2)");
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "Drug Name,ICD-10 Code,SMILES\n\
                   \"Acetylsalicylic acid, buffered\",\"M79.3\",CC(=O)Oc1ccccc1C(=O)O\n";
        let drugs = read_drug_records(csv.as_bytes()).unwrap();
        assert_eq!(drugs[0].drug_name, "Acetylsalicylic acid, buffered");
    }

    #[test]
    fn test_missing_cells_read_as_empty() {
        let csv = "Plant Name,Country of Origin,SMILES\n\
                   Willow,,OC(=O)c1ccccc1O\n\
                   Meadowsweet,Europe\n";
        let plants = read_plant_records(csv.as_bytes()).unwrap();
        assert_eq!(plants[0].country_of_origin, "");
        assert_eq!(plants[1].structure, "");
    }

    #[test]
    fn test_missing_column() {
        let csv = "Drug Name,SMILES\nAspirin,CCO\n";
        match read_drug_records(csv.as_bytes()) {
            Err(TableError::MissingColumn { column, .. }) => assert_eq!(column, "ICD-10 code"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_byte_order_mark() {
        let csv = "\u{feff}Drug Name,ICD-10 Code,SMILES\nAspirin,M79.3,CCO\n";
        assert_eq!(read_drug_records(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_gzipped_table() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plants.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(b"Plant Name,Country of Origin,SMILES\nWillow,Europe,OC(=O)c1ccccc1O\n")
            .unwrap();
        encoder.finish().unwrap();

        let plants = read_plant_records(open_table(&path).unwrap()).unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].plant_name, "Willow");
    }
}

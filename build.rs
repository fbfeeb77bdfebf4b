use std::path::Path;

/// An embedded table and the headers its first line must contain
struct EmbeddedTable {
    path: &'static str,
    required: &'static [&'static str],
}

const TABLES: &[EmbeddedTable] = &[
    EmbeddedTable {
        path: "data/drug_chemicals.csv",
        required: &["Drug Name", "ICD-10 Code", "SMILES"],
    },
    EmbeddedTable {
        path: "data/plant_chemicals.csv",
        required: &["Plant Name", "Country of Origin", "SMILES"],
    },
];

fn main() {
    for table in TABLES {
        validate_table_file(table);
    }
    set_build_dependencies();
}

fn validate_table_file(table: &EmbeddedTable) {
    let path = Path::new(table.path);

    // Ensure table exists at build time
    assert!(
        path.exists(),
        "\n\nTABLE BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the table file before building.\n",
        path.display()
    );

    let contents = std::fs::read_to_string(path).unwrap_or_else(|e| {
        panic!(
            "\n\nTABLE BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            path.display()
        );
    });

    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().unwrap_or_else(|| {
        panic!(
            "\n\nTABLE BUILD ERROR: Empty table\n\
             Path: {}\n",
            path.display()
        );
    });

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    for required in table.required {
        assert!(
            columns.contains(required),
            "\n\nTABLE BUILD ERROR: Missing '{required}' column\n\
             Path: {}\n\
             Header: {header}\n",
            path.display()
        );
    }

    let mut rows = 0;
    for (i, line) in lines.enumerate() {
        validate_row(line, columns.len(), path, i + 2);
        rows += 1;
    }

    println!(
        "cargo:warning=Validated table {}: {rows} rows",
        path.display()
    );
}

fn validate_row(line: &str, expected: usize, path: &Path, line_number: usize) {
    // The embedded tables never quote fields, so a plain split is exact
    let cells: Vec<&str> = line.split(',').collect();
    assert!(
        cells.len() == expected,
        "\n\nTABLE BUILD ERROR: Line {line_number} has {} fields, expected {expected}\n\
         Path: {}\n\
         Hint: Embedded tables must not contain quoted commas.\n",
        cells.len(),
        path.display()
    );
    assert!(
        cells.iter().all(|cell| !cell.trim().is_empty()),
        "\n\nTABLE BUILD ERROR: Line {line_number} has an empty field\n\
         Path: {}\n",
        path.display()
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the tables change
    for table in TABLES {
        println!("cargo:rerun-if-changed={}", table.path);
    }

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}

use clap::{Args, Subcommand};

use crate::catalog::lookup::{resolve_disease_chemicals, resolve_region_plants};
use crate::cli::{OutputFormat, TableArgs};
use crate::utils::validation::validate_query_field;

#[derive(Args)]
pub struct TablesArgs {
    #[command(subcommand)]
    pub command: TablesCommands,

    #[command(flatten)]
    pub tables: TableArgs,
}

#[derive(Subcommand)]
pub enum TablesCommands {
    /// List the drug chemicals indicated for a disease
    Drugs {
        /// ICD-10 disease code or code prefix
        #[arg(short, long, required = true)]
        disease: String,
    },

    /// List the plant chemicals from a region
    Plants {
        /// Region, matched against the country of origin
        #[arg(short, long, required = true)]
        region: String,
    },

    /// Show the number of records in each table
    Summary,
}

pub fn run(args: TablesArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let (drugs, plants) = args.tables.load()?;

    match args.command {
        TablesCommands::Drugs { disease } => {
            let disease = validate_query_field("disease", &disease)?;
            let chemicals = resolve_disease_chemicals(&drugs, &disease);
            match format {
                OutputFormat::Text => {
                    if chemicals.is_empty() {
                        println!("No drugs found for disease '{disease}'.");
                    }
                    for chemical in &chemicals {
                        println!("{}: {}", chemical.drug_name, chemical.structure);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&chemicals)?);
                }
                OutputFormat::Tsv => {
                    println!("drug_name\tstructure");
                    for chemical in &chemicals {
                        println!("{}\t{}", chemical.drug_name, chemical.structure);
                    }
                }
            }
        }
        TablesCommands::Plants { region } => {
            let region = validate_query_field("region", &region)?;
            let records = resolve_region_plants(&plants, &region);
            match format {
                OutputFormat::Text => {
                    if records.is_empty() {
                        println!("No plants found for region '{region}'.");
                    }
                    for record in &records {
                        println!(
                            "{} ({}): {}",
                            record.plant_name, record.country_of_origin, record.structure
                        );
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                }
                OutputFormat::Tsv => {
                    println!("plant_name\tcountry_of_origin\tstructure");
                    for record in &records {
                        println!(
                            "{}\t{}\t{}",
                            record.plant_name, record.country_of_origin, record.structure
                        );
                    }
                }
            }
        }
        TablesCommands::Summary => match format {
            OutputFormat::Text => {
                println!("Drug records:  {}", drugs.len());
                println!("Plant records: {}", plants.len());
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "drug_records": drugs.len(),
                    "plant_records": plants.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Tsv => {
                println!("table\trecords");
                println!("drugs\t{}", drugs.len());
                println!("plants\t{}", plants.len());
            }
        },
    }

    Ok(())
}

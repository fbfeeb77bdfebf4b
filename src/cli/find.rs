use clap::Args;

use crate::cli::{OutputFormat, TableArgs};
use crate::matching::engine::{
    MatchQuery, MatchResult, MatchingConfig, MatchingEngine, DEFAULT_SIMILARITY_THRESHOLD,
};

#[derive(Args)]
pub struct MatchArgs {
    /// ICD-10 disease code or code prefix (e.g., "M79")
    #[arg(short, long, required = true)]
    pub disease: String,

    /// Region to search, matched against the plants' country of origin (e.g., "Europe")
    #[arg(short, long, required = true)]
    pub region: String,

    /// Minimum Tanimoto similarity for a match (0 to 1)
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    #[command(flatten)]
    pub tables: TableArgs,
}

pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Validate before touching the tables
    let query = MatchQuery::new(&args.disease, &args.region)?;
    let config = MatchingConfig::with_threshold(args.threshold)?;

    let (drugs, plants) = args.tables.load()?;

    if verbose {
        eprintln!(
            "Loaded {} drug records and {} plant records",
            drugs.len(),
            plants.len()
        );
    }

    let engine = MatchingEngine::with_config(&drugs, &plants, config);
    let result = engine.find_matches(&query);

    match format {
        OutputFormat::Text => print_text_results(&query, &result, verbose),
        OutputFormat::Json => print_json_results(&query, &config, &result)?,
        OutputFormat::Tsv => print_tsv_results(&result),
    }

    Ok(())
}

fn print_text_results(query: &MatchQuery, result: &MatchResult, verbose: bool) {
    if verbose {
        let stats = &result.stats;
        eprintln!(
            "Disease '{}': {} drug chemicals ({} parsed)",
            query.disease, stats.drug_chemicals, stats.drug_fingerprints
        );
        eprintln!(
            "Region '{}': {} plant chemicals, {} comparisons, {} unparsable structures",
            query.region, stats.regional_plants, stats.comparisons, stats.parse_failures
        );
    }

    if result.is_empty() {
        println!("No matching plants found.");
        return;
    }

    for plant in &result.plants {
        println!("{plant}");
    }
}

fn print_json_results(
    query: &MatchQuery,
    config: &MatchingConfig,
    result: &MatchResult,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "query": {
            "disease": query.disease,
            "region": query.region,
            "threshold": config.similarity_threshold,
        },
        "plants": result.plants,
        "stats": result.stats,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(result: &MatchResult) {
    println!("plant");
    for plant in &result.plants {
        println!("{plant}");
    }
}

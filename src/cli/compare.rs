use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::fingerprint::{
    morgan_fingerprint, Fingerprint, FingerprintParams, DEFAULT_NBITS, DEFAULT_RADIUS,
};
use crate::matching::scoring::tanimoto_similarity;
use crate::parsing::smiles::parse_smiles;

#[derive(Args)]
pub struct SimilarityArgs {
    /// First structure (SMILES)
    #[arg(required = true)]
    pub structure_a: String,

    /// Second structure (SMILES)
    #[arg(required = true)]
    pub structure_b: String,

    /// Fingerprint radius
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: u32,

    /// Fingerprint length in bits
    #[arg(long, default_value_t = DEFAULT_NBITS)]
    pub nbits: usize,
}

pub fn run(args: SimilarityArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.nbits == 0 {
        anyhow::bail!("--nbits must be at least 1");
    }

    let params = FingerprintParams {
        radius: args.radius,
        nbits: args.nbits,
    };

    let fp_a = fingerprint(&args.structure_a, params)?;
    let fp_b = fingerprint(&args.structure_b, params)?;
    let similarity = tanimoto_similarity(&fp_a, &fp_b);

    if verbose {
        eprintln!(
            "Structure A: {} bits set; structure B: {} bits set; {} shared",
            fp_a.count_ones(),
            fp_b.count_ones(),
            fp_a.intersection_count(&fp_b)
        );
    }

    match format {
        OutputFormat::Text => println!("{similarity:.4}"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "structure_a": args.structure_a,
                "structure_b": args.structure_b,
                "radius": params.radius,
                "nbits": params.nbits,
                "bits_a": fp_a.count_ones(),
                "bits_b": fp_b.count_ones(),
                "shared_bits": fp_a.intersection_count(&fp_b),
                "similarity": similarity,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("structure_a\tstructure_b\tsimilarity");
            println!(
                "{}\t{}\t{similarity:.4}",
                args.structure_a, args.structure_b
            );
        }
    }

    Ok(())
}

fn fingerprint(structure: &str, params: FingerprintParams) -> anyhow::Result<Fingerprint> {
    let mol = parse_smiles(structure)
        .with_context(|| format!("Could not parse structure '{structure}'"))?;
    Ok(morgan_fingerprint(&mol, params))
}

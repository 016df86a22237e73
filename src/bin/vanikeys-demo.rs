//! Thin CLI shell around `vanikeys_core`. Not the product surface (no
//! HTTP, storage, or job queue lives here) — just enough plumbing to
//! exercise the library end to end from a terminal.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use vanikeys_core::derivation::{
    derive_child_keypair, generate_master_seed, seed_to_root_keypair, Seed,
};
use vanikeys_core::difficulty;
use vanikeys_core::fingerprint;
use vanikeys_core::pattern::{self, FuzzyMode, PatternSpec};
use vanikeys_core::proof;

#[derive(Parser)]
#[command(name = "vanikeys-demo")]
#[command(about = "Demo CLI for the vanikeys HD vanity SSH key engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh random master seed, printed as hex.
    Seed,

    /// Derive the root and a single child keypair from a hex seed.
    Derive {
        /// 64 hex chars (32 bytes).
        #[arg(long)]
        seed: String,

        /// Child index to derive.
        #[arg(long)]
        index: u32,
    },

    /// Search child indices of a seed for one whose fingerprint matches
    /// a contains pattern, up to `max_attempts`.
    Search {
        #[arg(long)]
        seed: String,

        #[arg(long)]
        contains: String,

        #[arg(long, default_value = "case_insensitive")]
        case: String,

        #[arg(long, default_value = "1000000")]
        max_attempts: u32,
    },

    /// Estimate the difficulty of a contains pattern.
    Estimate {
        #[arg(long)]
        contains: String,

        #[arg(long, default_value = "case_insensitive")]
        case: String,
    },

    /// Verify a previously generated order proof (JSON on stdin is not
    /// read here; pass the proof and pattern text directly for the demo).
    Verify {
        #[arg(long)]
        seed: String,

        #[arg(long)]
        index: u32,

        #[arg(long)]
        contains: String,
    },
}

fn parse_seed(hex_str: &str) -> Result<Seed> {
    let bytes = hex::decode(hex_str).context("seed must be valid hex")?;
    Seed::from_slice(&bytes).map_err(|e| anyhow::anyhow!("{e}"))
}

fn case_sensitive_from(case: &str) -> Result<bool> {
    match case {
        "case_sensitive" => Ok(true),
        "case_insensitive" => Ok(false),
        other => bail!("unknown --case value '{other}', expected case_sensitive or case_insensitive"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed => {
            let seed = generate_master_seed().context("failed to sample master seed")?;
            println!("{}", hex::encode(seed.as_bytes()));
        }

        Commands::Derive { seed, index } => {
            let seed = parse_seed(&seed)?;
            let root = seed_to_root_keypair(&seed);
            let child = derive_child_keypair(&seed, index);
            let fp = fingerprint::ssh_fingerprint(&child.public_bytes);

            println!("root_pub:  {}", hex::encode(root.public_bytes));
            println!("child_pub: {}", hex::encode(child.public_bytes));
            println!("fingerprint: {fp}");
            println!(
                "authorized_keys: {}",
                fingerprint::authorized_keys_line(&child.public_bytes, Some("vanikeys"))
            );
        }

        Commands::Search {
            seed,
            contains,
            case,
            max_attempts,
        } => {
            let seed = parse_seed(&seed)?;
            let case_sensitive = case_sensitive_from(&case)?;
            let pattern_spec = PatternSpec::Contains {
                text: contains,
                fuzzy: FuzzyMode::None,
                case_sensitive,
            };
            let compiled = pattern::compile_pattern(pattern_spec)
                .map_err(|errs| anyhow::anyhow!("invalid pattern: {errs:?}"))?;
            for w in compiled.warnings() {
                eprintln!("warning: {w}");
            }

            let mut found = None;
            for index in 0..max_attempts {
                let child = derive_child_keypair(&seed, index);
                let fp = fingerprint::ssh_fingerprint(&child.public_bytes);
                if pattern::match_fingerprint(&compiled, &fp).is_some() {
                    found = Some(index);
                    break;
                }
            }

            match found {
                Some(index) => {
                    let proof = proof::generate_order_proof(&seed, index, &compiled)
                        .context("matched index failed to produce a proof")?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&proof).context("failed to serialize proof")?
                    );
                }
                None => {
                    println!("no match found within {max_attempts} attempts");
                }
            }
        }

        Commands::Estimate { contains, case } => {
            let case_sensitive = case_sensitive_from(&case)?;
            let compiled = pattern::compile_pattern(PatternSpec::Contains {
                text: contains,
                fuzzy: FuzzyMode::None,
                case_sensitive,
            })
            .map_err(|errs| anyhow::anyhow!("invalid pattern: {errs:?}"))?;

            let est = difficulty::estimate(&compiled, None);
            println!("tier: {:?}", est.tier);
            println!("expected_attempts: {:?}", est.expected_attempts);
            println!("duration: {}", est.duration_str);
            println!("probability: {}", est.probability_str);
        }

        Commands::Verify {
            seed,
            index,
            contains,
        } => {
            let seed = parse_seed(&seed)?;
            let compiled = pattern::compile_pattern(PatternSpec::Contains {
                text: contains,
                fuzzy: FuzzyMode::None,
                case_sensitive: false,
            })
            .map_err(|errs| anyhow::anyhow!("invalid pattern: {errs:?}"))?;

            let order_proof = proof::generate_order_proof(&seed, index, &compiled)
                .context("index does not match pattern")?;
            let report = proof::verify_order_proof(&order_proof, &seed, &compiled);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

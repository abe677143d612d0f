//! Roster Generation Utility
//!
//! Run with: cargo run --bin generate-roster -- --output roster.toml
//!
//! Writes a random roster: priced traders for cycle detection and
//! price-banded traders for triad matching.

use clap::Parser;
use color_eyre::eyre::Result;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use barter::market::{generate_drafts, generate_ranged_traders, PricingModel, Roster};
use barter::matching::find_cycles;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a random barter roster")]
struct Cli {
    /// Output file (.toml or .json).
    #[arg(long, default_value = "roster.toml")]
    output: PathBuf,

    /// Priced traders for cycle detection.
    #[arg(long, default_value_t = 12)]
    traders: usize,

    /// Price-banded traders for triad matching.
    #[arg(long, default_value_t = 100)]
    ranged: usize,

    /// Seed for a reproducible roster.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          BARTER ROSTER GENERATOR                           ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let roster = Roster {
        traders: generate_drafts(cli.traders, &mut rng),
        ranged_traders: generate_ranged_traders(cli.ranged, &mut rng),
    };

    // Preview how many loops the priced half already contains
    let traders = roster.priced_traders(&PricingModel::default())?;
    let cycles = find_cycles(&traders);

    roster.save(&cli.output)?;

    println!("📝 ROSTER WRITTEN");
    println!();
    println!("   File:            {}", style(cli.output.display()).cyan());
    println!("   Priced traders:  {}", roster.traders.len());
    println!("   Ranged traders:  {}", roster.ranged_traders.len());
    println!("   Trade cycles:    {}", cycles.len());
    if let Some(seed) = cli.seed {
        println!("   Seed:            {}", seed);
    }
    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("   Run it with:");
    println!("   cargo run -- --roster {}", cli.output.display());
    println!();

    Ok(())
}

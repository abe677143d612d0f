//! Barter - Multi-Party Trade Matcher
//!
//! Run with: cargo run -- [--roster traders.toml] [--mode cycles|triads|all]
//!
//! Finds closed trade loops among priced traders, settles each loop in cash,
//! then forms buyer → pivot → seller triads among price-banded traders.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barter::config::{Config, RunLog};
use barter::market::{demo_roster, generate_ranged_traders, Roster};
use barter::matching::{find_trade_triads, TriadOutcome};
use barter::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Cycles,
    Triads,
    All,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-party barter matcher")]
struct Cli {
    /// TOML configuration file; environment variables are used otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roster file (.toml or .json). Overrides ROSTER_PATH.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Ranged traders to generate when the roster has none.
    #[arg(long)]
    generate: Option<usize>,

    /// Seed for roster generation and random counterpart selection.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔁 BARTER - Multi-Party Trade Matcher").cyan().bold()
    );
    println!(
        "{}",
        style("    Trade Cycles | Cash Settlement | Pivot Triads").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(roster) = &cli.roster {
        config.roster_path = Some(roster.display().to_string());
    }
    if let Some(count) = cli.generate {
        config.generated_traders = count;
    }
    if cli.seed.is_some() {
        config.selection_seed = cli.seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("barter=info".parse()?),
        )
        .init();

    print_banner();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or --config");
        return Err(e);
    }

    config.print_summary();
    println!();

    let roster = match &config.roster_path {
        Some(path) => Roster::load(path)?,
        None => {
            info!("No roster given, using the demo roster");
            demo_roster()
        }
    };

    // =============================================
    // PHASE 1: TRADE CYCLES
    // =============================================
    let traders = roster.priced_traders(&config.pricing)?;
    let mut cycles = Vec::new();

    if cli.mode != Mode::Triads {
        println!();
        println!("{}", style("═══ PHASE 1: TRADE CYCLES ═══").blue().bold());

        report::print_traders(&traders);

        let start = Instant::now();
        cycles = config.cycle_finder().find_cycles(&traders);
        info!("Cycle search took {:?}", start.elapsed());

        report::print_cycles(&cycles);
    }

    // =============================================
    // PHASE 2: PIVOT TRIADS
    // =============================================
    let mut ranged = Vec::new();
    let mut outcome = TriadOutcome::default();

    if cli.mode != Mode::Cycles {
        println!();
        println!("{}", style("═══ PHASE 2: PIVOT TRIADS ═══").blue().bold());

        ranged = roster.validated_ranged_traders()?;
        if ranged.is_empty() {
            let mut rng = match config.selection_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            ranged = generate_ranged_traders(config.generated_traders, &mut rng);
            info!("Generated {} ranged traders", ranged.len());
        }

        let mut selector = config.selector();
        let start = Instant::now();
        outcome = find_trade_triads(&ranged, selector.as_mut());
        info!("Triad matching took {:?}", start.elapsed());

        report::print_triads(&outcome);
        report::print_statuses(&outcome);
    }

    if config.report_log {
        let log = RunLog::new(traders.len(), &cycles, ranged.len(), &outcome);
        log.append_to_file(&config.report_log_path)?;
        info!("Run appended to {}", config.report_log_path);
    }

    println!();
    println!("{}", style("Done.").green().bold());
    Ok(())
}

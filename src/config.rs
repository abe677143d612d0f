//! Configuration for the barter engine
//!
//! Loaded from environment variables (and `.env`) or a TOML file, then
//! validated before any roster is processed.

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::market::{Money, PricingModel};
use crate::matching::{
    CounterpartSelector, CycleFinder, CycleIdentity, Readiness, SelectionMode, TradeCycle, TriadOutcome,
};

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Cycle Settings ==========
    /// Longest cycle to search for; unbounded when unset
    pub max_cycle_len: Option<usize>,

    /// How duplicate cycles are recognised
    pub cycle_identity: CycleIdentity,

    // ========== Triad Settings ==========
    /// How one counterpart is chosen among several qualified ones
    pub selection_mode: SelectionMode,

    /// Seed for random selection; fresh entropy when unset
    pub selection_seed: Option<u64>,

    // ========== Input ==========
    /// Roster file (.toml or .json); the demo roster is used when unset
    pub roster_path: Option<String>,

    /// Ranged traders to generate when the roster has none
    pub generated_traders: usize,

    // ========== Output ==========
    /// Append a JSON line per run to `report_log_path`
    pub report_log: bool,

    pub report_log_path: String,

    // ========== Pricing ==========
    pub pricing: PricingModel,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn env_optional<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let default_pricing = defaults.pricing.clone();

        Ok(Self {
            // Cycles
            max_cycle_len: env_optional("MAX_CYCLE_LEN"),
            cycle_identity: env_parse("CYCLE_IDENTITY", defaults.cycle_identity),

            // Triads
            selection_mode: env_parse("SELECTION_MODE", defaults.selection_mode),
            selection_seed: env_optional("SELECTION_SEED"),

            // Input
            roster_path: env::var("ROSTER_PATH").ok().filter(|p| !p.trim().is_empty()),
            generated_traders: env_parse("GENERATED_TRADERS", defaults.generated_traders),

            // Output
            report_log: env_parse("REPORT_LOG", defaults.report_log),
            report_log_path: env::var("REPORT_LOG_PATH").unwrap_or(defaults.report_log_path),

            // Pricing
            pricing: PricingModel {
                usage_step: env_parse("USAGE_STEP", default_pricing.usage_step),
                depreciation_per_step: env_parse(
                    "DEPRECIATION_PER_STEP",
                    default_pricing.depreciation_per_step,
                ),
                usage_floor: env_parse("USAGE_FLOOR", default_pricing.usage_floor),
                fallback_base_price: env_parse(
                    "FALLBACK_BASE_PRICE",
                    default_pricing.fallback_base_price,
                ),
                fallback_condition_multiplier: env_parse(
                    "FALLBACK_CONDITION_MULTIPLIER",
                    default_pricing.fallback_condition_multiplier,
                ),
                extra_base_prices: default_pricing.extra_base_prices,
            },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()?;

        if let Some(max) = self.max_cycle_len {
            if max < 2 {
                return Err(eyre::eyre!(
                    "MAX_CYCLE_LEN must be at least 2 (currently {})",
                    max
                ));
            }
        }
        if self.report_log && self.report_log_path.trim().is_empty() {
            return Err(eyre::eyre!("REPORT_LOG is enabled but REPORT_LOG_PATH is empty"));
        }

        Ok(())
    }

    pub fn cycle_finder(&self) -> CycleFinder {
        CycleFinder::new(self.cycle_identity, self.max_cycle_len)
    }

    pub fn selector(&self) -> Box<dyn CounterpartSelector> {
        self.selection_mode.selector(self.selection_seed)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let or_unset = |value: Option<String>, unset: &str| value.unwrap_or_else(|| unset.to_string());

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 BARTER - CONFIGURATION                     ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ PRICING                                                    ║");
        println!("║ • Usage Step:      {:<40} ║", self.pricing.usage_step);
        println!("║ • Depreciation:    {:<39.2}% ║", self.pricing.depreciation_per_step * 100.0);
        println!("║ • Usage Floor:     {:<39.0}% ║", self.pricing.usage_floor * 100.0);
        println!("║ • Fallback Base:   {:<40} ║", crate::market::format_amount(self.pricing.fallback_base_price));
        println!("║ • Extra Prices:    {:<40} ║", self.pricing.extra_base_prices.len());
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CYCLES                                                     ║");
        println!("║ • Max Length:      {:<40} ║",
            or_unset(self.max_cycle_len.map(|n| n.to_string()), "unbounded")
        );
        println!("║ • Identity:        {:<40} ║", self.cycle_identity);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ TRIADS                                                     ║");
        println!("║ • Selection:       {:<40} ║", self.selection_mode);
        println!("║ • Seed:            {:<40} ║",
            or_unset(self.selection_seed.map(|s| s.to_string()), "entropy")
        );
        println!("║ • Generated:       {:<40} ║", self.generated_traders);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ INPUT / OUTPUT                                             ║");
        println!("║ • Roster:          {:<40} ║", or_unset(self.roster_path.clone(), "demo"));
        println!("║ • Report Log:      {:<40} ║",
            if self.report_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cycle_len: None,
            cycle_identity: CycleIdentity::Members,
            selection_mode: SelectionMode::Random,
            selection_seed: None,
            roster_path: None,
            generated_traders: 100,
            report_log: false,
            report_log_path: "./logs/barter_runs.jsonl".to_string(),
            pricing: PricingModel::default(),
        }
    }
}

// ============================================
// RUN LOGGER
// ============================================

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub timestamp: DateTime<Utc>,
    pub traders: usize,
    pub cycles: Vec<String>,
    pub cash_settled: Money,
    pub ranged_traders: usize,
    pub triads: usize,
    pub ready: usize,
    pub partial: usize,
    pub waiting: usize,
}

impl RunLog {
    pub fn new(traders: usize, cycles: &[TradeCycle], ranged_traders: usize, outcome: &TriadOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            traders,
            cycles: cycles.iter().map(TradeCycle::path).collect(),
            cash_settled: cycles.iter().map(TradeCycle::total_cash).sum(),
            ranged_traders,
            triads: outcome.triads.len(),
            ready: outcome.count(Readiness::Ready),
            partial: outcome.count(Readiness::Partial),
            waiting: outcome.count(Readiness::Waiting),
        }
    }

    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::demo_roster;
    use crate::matching::find_cycles;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cycle_identity, CycleIdentity::Members);
        assert_eq!(config.max_cycle_len, None);
        assert_eq!(config.generated_traders, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cycle_cap_below_two_rejected() {
        let config = Config { max_cycle_len: Some(1), ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { max_cycle_len: Some(2), ..Config::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_pricing_rejected() {
        let mut config = Config::default();
        config.pricing.usage_floor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barter.toml");

        let mut config = Config {
            max_cycle_len: Some(4),
            cycle_identity: CycleIdentity::Rotation,
            selection_mode: SelectionMode::RoundRobin,
            selection_seed: Some(7),
            roster_path: Some("roster.json".to_string()),
            ..Config::default()
        };
        config.pricing.extra_base_prices.insert("Lada".to_string(), 300_000);

        config.save_to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "selection_mode = \"round_robin\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.selection_mode, SelectionMode::RoundRobin);
        assert_eq!(config.pricing, PricingModel::default());
    }

    #[test]
    fn test_run_log_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("runs.jsonl");

        let traders = demo_roster().priced_traders(&PricingModel::default()).unwrap();
        let cycles = find_cycles(&traders);
        let log = RunLog::new(traders.len(), &cycles, 0, &TriadOutcome::default());
        assert_eq!(log.cycles.len(), 2);

        log.append_to_file(&path).unwrap();
        log.append_to_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: RunLog = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.traders, 7);
        assert_eq!(parsed.cash_settled, log.cash_settled);
    }
}

//! Roster loading and generation
//!
//! A roster file holds two arrays: `traders` (priced, for cycle detection) and
//! `ranged_traders` (price bands, for triad matching). TOML and JSON are both
//! accepted, picked by file extension.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::catalog::{self, Condition, GENERATOR_MODELS, GENERATOR_NAMES};
use super::pricing::PricingModel;
use super::trader::{PriceRange, RangedTrader, Trader, TraderDraft, TraderId};
use crate::error::{Result, RosterError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub traders: Vec<TraderDraft>,
    pub ranged_traders: Vec<RangedTrader>,
}

enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(RosterError::UnsupportedFormat { path: path.to_path_buf() }),
    }
}

impl Roster {
    /// Load a roster from a `.toml` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let content = fs::read_to_string(path)?;
        let roster: Self = match format {
            Format::Toml => toml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        info!(
            "Loaded roster {}: {} traders, {} ranged traders",
            path.display(),
            roster.traders.len(),
            roster.ranged_traders.len()
        );
        Ok(roster)
    }

    /// Save the roster, format picked by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let path = path.as_ref();
        let content = match format_of(path)? {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Price every draft, rejecting malformed records and duplicate ids.
    pub fn priced_traders(&self, pricing: &PricingModel) -> Result<Vec<Trader>> {
        let mut seen = HashSet::new();
        let mut traders = Vec::with_capacity(self.traders.len());
        for draft in &self.traders {
            let trader = draft.clone().price(pricing)?;
            if !seen.insert(trader.id().clone()) {
                return Err(RosterError::DuplicateId { id: trader.id().clone() });
            }
            traders.push(trader);
        }
        Ok(traders)
    }

    /// Validated ranged traders, rejecting inverted bands and duplicate ids.
    pub fn validated_ranged_traders(&self) -> Result<Vec<RangedTrader>> {
        let mut seen = HashSet::new();
        for trader in &self.ranged_traders {
            trader.validate()?;
            if !seen.insert(&trader.id) {
                return Err(RosterError::DuplicateId { id: trader.id.clone() });
            }
        }
        Ok(self.ranged_traders.clone())
    }
}

// ============================================
// DEMO ROSTER
// ============================================

/// Seven traders: two three-party loops and one trader nobody can serve.
pub fn demo_roster() -> Roster {
    let traders = vec![
        TraderDraft::new("1", "Serap", "BMW", "Opel").usage(50_000).condition(Condition::Good),
        TraderDraft::new("2", "Bayram", "Audi", "BMW").usage(30_000).condition(Condition::Excellent),
        TraderDraft::new("3", "Ufuk", "Opel", "Audi").usage(80_000).condition(Condition::Fair),
        TraderDraft::new("4", "Ertugrul", "Ford", "Toyota").usage(60_000).condition(Condition::Good),
        TraderDraft::new("5", "Mirac", "Toyota", "Honda").usage(40_000).condition(Condition::Excellent),
        TraderDraft::new("6", "Sare", "Honda", "Ford").usage(70_000).condition(Condition::Fair),
        TraderDraft::new("7", "Yigit", "Togg", "Tesla").usage(10_000).condition(Condition::Excellent),
    ];
    Roster { traders, ranged_traders: Vec::new() }
}

// ============================================
// RANDOM GENERATION
// ============================================

fn pick<'a, R: Rng>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or("BMW")
}

/// Random traders with overlapping preferences for triad matching.
///
/// Wants are biased toward the first five (popular) models; bands sit around the
/// owned model's base price: min in [0.85, 0.95), max in [1.05, 1.20).
pub fn generate_ranged_traders<R: Rng>(count: usize, rng: &mut R) -> Vec<RangedTrader> {
    let pricing = PricingModel::default();
    let popular = &GENERATOR_MODELS[..5];

    let traders: Vec<RangedTrader> = (0..count)
        .map(|i| {
            let has_item = pick(rng, &GENERATOR_MODELS);
            let wants_item = if rng.gen_bool(0.7) {
                pick(rng, &GENERATOR_MODELS)
            } else {
                pick(rng, popular)
            };

            let base = pricing.base_price(has_item) as f64;
            let min = (base * rng.gen_range(0.85..0.95)).round() as i64;
            let max = (base * rng.gen_range(1.05..1.20)).round() as i64;

            RangedTrader {
                id: TraderId::new(format!("trader-{}", i + 1)),
                name: format!("{} {}", GENERATOR_NAMES[i % GENERATOR_NAMES.len()], i + 1),
                has_item: has_item.to_string(),
                wants_item: wants_item.to_string(),
                price_range: PriceRange::new(min, max),
            }
        })
        .collect();

    debug!("Generated {} ranged traders", traders.len());
    traders
}

/// Random priced-trader drafts for cycle detection, drawn from the whole catalog.
pub fn generate_drafts<R: Rng>(count: usize, rng: &mut R) -> Vec<TraderDraft> {
    let models: Vec<&str> = catalog::categories().collect();

    (0..count)
        .map(|i| {
            let has_item = pick(rng, &models);
            let mut wants_item = pick(rng, &models);
            while wants_item == has_item {
                wants_item = pick(rng, &models);
            }
            let condition = Condition::TIERS.choose(rng).copied().unwrap_or_default();
            TraderDraft::new(
                (i + 1).to_string(),
                GENERATOR_NAMES[i % GENERATOR_NAMES.len()],
                has_item,
                wants_item,
            )
            .usage(rng.gen_range(0..=300) * 1_000)
            .condition(condition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_demo_roster_prices() {
        let traders = demo_roster().priced_traders(&PricingModel::default()).unwrap();
        assert_eq!(traders.len(), 7);
        assert_eq!(traders[0].price(), 918_000);
        assert_eq!(traders[1].price(), 1_034_000);
        assert_eq!(traders[2].price(), 352_800);
        // Togg, 10,000 km, excellent: 2M × 0.98
        assert_eq!(traders[6].price(), 1_960_000);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut roster = demo_roster();
        roster.traders.push(TraderDraft::new("3", "Copy", "Fiat", "Kia"));
        let err = roster.priced_traders(&PricingModel::default()).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateId { id } if id.as_str() == "3"));
    }

    #[test]
    fn test_generated_ranged_traders_are_valid_and_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        let traders = generate_ranged_traders(100, &mut rng);
        assert_eq!(traders.len(), 100);

        let roster = Roster { traders: vec![], ranged_traders: traders.clone() };
        assert!(roster.validated_ranged_traders().is_ok());

        for t in &traders {
            let base = catalog::base_price(&t.has_item).unwrap();
            assert!(t.price_range.min < base && t.price_range.max > base);
        }

        let mut again = StdRng::seed_from_u64(7);
        assert_eq!(generate_ranged_traders(100, &mut again), traders);
    }

    #[test]
    fn test_generated_drafts_never_want_what_they_have() {
        let mut rng = StdRng::seed_from_u64(11);
        let drafts = generate_drafts(50, &mut rng);
        assert!(drafts.iter().all(|d| d.has_item != d.wants_item));

        let roster = Roster { traders: drafts, ranged_traders: vec![] };
        assert_eq!(roster.priced_traders(&PricingModel::default()).unwrap().len(), 50);
    }

    #[test]
    fn test_toml_and_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut roster = demo_roster();
        roster.ranged_traders = generate_ranged_traders(5, &mut rng);

        for name in ["roster.toml", "roster.json"] {
            let path = dir.path().join(name);
            roster.save(&path).unwrap();
            assert_eq!(Roster::load(&path).unwrap(), roster);
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = Roster::load("traders.yaml").unwrap_err();
        assert!(matches!(err, RosterError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_lenient_condition_in_file() {
        let toml = r#"
            [[traders]]
            id = "1"
            name = "Serap"
            has_item = "BMW"
            wants_item = "Opel"
            usage = 50000
            condition = "İyi"
        "#;
        let roster: Roster = toml::from_str(toml).unwrap();
        let traders = roster.priced_traders(&PricingModel::default()).unwrap();
        assert_eq!(traders[0].condition(), Condition::Good);
        assert_eq!(traders[0].price(), 918_000);
    }
}

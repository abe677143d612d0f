//! Counterpart selection for triads
//!
//! When several buyers (or sellers) qualify for a pivot, one is picked by a
//! pluggable selector so no candidate is systematically starved and tests can
//! pin the choice down.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::market::RangedTrader;

/// Side of the pivot a counterpart fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Wants the pivot's item
    Buyer,
    /// Owns what the pivot wants
    Seller,
}

pub trait CounterpartSelector {
    /// Index into `candidates`, which is never empty.
    fn select(&mut self, pivot: &RangedTrader, role: Role, candidates: &[&RangedTrader]) -> usize;
}

/// Uniform choice from a seedable generator
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl CounterpartSelector for RandomSelector {
    fn select(&mut self, _pivot: &RangedTrader, _role: Role, candidates: &[&RangedTrader]) -> usize {
        self.rng.gen_range(0..candidates.len())
    }
}

/// Rotates through each candidate pool. Pools are identified by role and the
/// item changing hands, so successive pivots trading the same item get
/// successive candidates.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    cursors: HashMap<(Role, String), usize>,
}

impl RoundRobinSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterpartSelector for RoundRobinSelector {
    fn select(&mut self, pivot: &RangedTrader, role: Role, candidates: &[&RangedTrader]) -> usize {
        let item = match role {
            Role::Buyer => &pivot.has_item,
            Role::Seller => &pivot.wants_item,
        };
        let cursor = self.cursors.entry((role, item.clone())).or_insert(0);
        let index = *cursor % candidates.len();
        *cursor += 1;
        index
    }
}

/// Selector choice as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Random,
    RoundRobin,
}

impl SelectionMode {
    /// Build the selector; a seed makes `Random` reproducible.
    pub fn selector(self, seed: Option<u64>) -> Box<dyn CounterpartSelector> {
        match (self, seed) {
            (SelectionMode::Random, Some(seed)) => Box::new(RandomSelector::seeded(seed)),
            (SelectionMode::Random, None) => Box::new(RandomSelector::from_entropy()),
            (SelectionMode::RoundRobin, _) => Box::new(RoundRobinSelector::new()),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Random => write!(f, "random"),
            SelectionMode::RoundRobin => write!(f, "round_robin"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(SelectionMode::Random),
            "round_robin" | "roundrobin" | "round-robin" => Ok(SelectionMode::RoundRobin),
            other => Err(format!("unknown selection mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceRange;

    fn trader(id: &str, has: &str, wants: &str) -> RangedTrader {
        RangedTrader::new(id, id, has, wants, PriceRange::new(10, 20)).unwrap()
    }

    #[test]
    fn test_round_robin_cycles_through_pool() {
        let pivot = trader("p", "BMW", "Audi");
        let (a, b, c) = (trader("a", "X", "BMW"), trader("b", "Y", "BMW"), trader("c", "Z", "BMW"));
        let pool = [&a, &b, &c];

        let mut selector = RoundRobinSelector::new();
        let picks: Vec<usize> = (0..4).map(|_| selector.select(&pivot, Role::Buyer, &pool)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0]);

        // Seller pool has its own cursor
        assert_eq!(selector.select(&pivot, Role::Seller, &pool), 0);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let pivot = trader("p", "BMW", "Audi");
        let pool_traders: Vec<RangedTrader> =
            (0..10).map(|i| trader(&format!("t{i}"), "X", "BMW")).collect();
        let pool: Vec<&RangedTrader> = pool_traders.iter().collect();

        let draw = |seed| {
            let mut selector = RandomSelector::seeded(seed);
            (0..20).map(|_| selector.select(&pivot, Role::Buyer, &pool)).collect::<Vec<_>>()
        };
        let first = draw(42);
        assert_eq!(first, draw(42));
        assert!(first.iter().all(|&i| i < pool.len()));
    }

    #[test]
    fn test_selection_mode_parsing() {
        assert_eq!("Round-Robin".parse::<SelectionMode>().unwrap(), SelectionMode::RoundRobin);
        assert_eq!("random".parse::<SelectionMode>().unwrap(), SelectionMode::Random);
        assert!("fifo".parse::<SelectionMode>().is_err());
    }
}

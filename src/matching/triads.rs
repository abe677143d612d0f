//! Pivot-Based Triad Matching
//!
//! Every trader is tried once as the pivot of a `[buyer] → [pivot] → [seller]`
//! group:
//! - buyers want the pivot's item and can pay at least the pivot's minimum
//! - sellers own what the pivot wants and ask no more than the pivot's maximum
//!
//! Buyers and sellers stay in the candidate pools after being matched, so a
//! trader can sit in several triads on the buyer or seller side.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use super::selector::{CounterpartSelector, Role};
use crate::market::{RangedTrader, TraderId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeTriad {
    pub id: String,
    /// Wants the pivot's item
    pub buyer: RangedTrader,
    pub pivot: RangedTrader,
    /// Owns what the pivot wants
    pub seller: RangedTrader,
}

/// Why a pivot found no triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchIssue {
    /// Nobody wants the pivot's item
    NoBuyer,
    /// Buyers exist but none can afford the pivot's item
    BuyerBudgetTooLow,
    /// Nobody owns what the pivot wants
    NoSeller,
    /// Sellers exist but all ask more than the pivot can pay
    SellerPriceTooHigh,
}

impl fmt::Display for MatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchIssue::NoBuyer => write!(f, "no buyer for item"),
            MatchIssue::BuyerBudgetTooLow => write!(f, "buyer budget too low"),
            MatchIssue::NoSeller => write!(f, "wanted item not available"),
            MatchIssue::SellerPriceTooHigh => write!(f, "seller price too high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// Pivot of a triad
    Ready,
    /// Only ever a buyer or seller for someone else
    Partial,
    Waiting,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Ready => write!(f, "ready to trade"),
            Readiness::Partial => write!(f, "partial match"),
            Readiness::Waiting => write!(f, "waiting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraderStatus {
    pub trader: RangedTrader,
    pub is_pivot: bool,
    pub is_buyer: bool,
    pub is_seller: bool,
    pub triad_count: usize,
    pub match_details: Vec<MatchIssue>,
}

impl TraderStatus {
    fn new(trader: &RangedTrader) -> Self {
        Self {
            trader: trader.clone(),
            is_pivot: false,
            is_buyer: false,
            is_seller: false,
            triad_count: 0,
            match_details: Vec::new(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        if self.is_pivot {
            Readiness::Ready
        } else if self.is_buyer || self.is_seller {
            Readiness::Partial
        } else {
            Readiness::Waiting
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriadOutcome {
    pub triads: Vec<TradeTriad>,
    /// One per trader, in input order
    pub statuses: Vec<TraderStatus>,
}

impl TriadOutcome {
    pub fn status(&self, id: &TraderId) -> Option<&TraderStatus> {
        self.statuses.iter().find(|s| &s.trader.id == id)
    }

    pub fn count(&self, readiness: Readiness) -> usize {
        self.statuses.iter().filter(|s| s.readiness() == readiness).count()
    }
}

/// Try every trader as a pivot and collect the triads that form.
pub fn find_trade_triads<S>(traders: &[RangedTrader], selector: &mut S) -> TriadOutcome
where
    S: CounterpartSelector + ?Sized,
{
    let mut statuses: Vec<TraderStatus> = traders.iter().map(TraderStatus::new).collect();
    let index: HashMap<&TraderId, usize> =
        traders.iter().enumerate().map(|(i, t)| (&t.id, i)).collect();
    let mut triads = Vec::new();

    for (pivot_idx, pivot) in traders.iter().enumerate() {
        let all_buyers: Vec<&RangedTrader> = traders
            .iter()
            .filter(|t| t.id != pivot.id && t.wants_item == pivot.has_item)
            .collect();
        let all_sellers: Vec<&RangedTrader> = traders
            .iter()
            .filter(|t| t.id != pivot.id && t.has_item == pivot.wants_item)
            .collect();

        let buyers: Vec<&RangedTrader> =
            all_buyers.iter().copied().filter(|b| b.can_afford(pivot)).collect();
        let sellers: Vec<&RangedTrader> =
            all_sellers.iter().copied().filter(|s| pivot.can_afford(s)).collect();

        if !buyers.is_empty() && !sellers.is_empty() {
            let buyer = buyers[selector.select(pivot, Role::Buyer, &buyers).min(buyers.len() - 1)];
            let seller = sellers[selector.select(pivot, Role::Seller, &sellers).min(sellers.len() - 1)];

            triads.push(TradeTriad {
                id: format!("triad-{}", triads.len() + 1),
                buyer: buyer.clone(),
                pivot: pivot.clone(),
                seller: seller.clone(),
            });

            let status = &mut statuses[pivot_idx];
            status.is_pivot = true;
            status.triad_count += 1;

            if let Some(&i) = index.get(&buyer.id) {
                statuses[i].is_buyer = true;
                statuses[i].triad_count += 1;
            }
            if let Some(&i) = index.get(&seller.id) {
                statuses[i].is_seller = true;
                statuses[i].triad_count += 1;
            }
            continue;
        }

        let mut details = Vec::new();
        if all_buyers.is_empty() {
            details.push(MatchIssue::NoBuyer);
        } else if buyers.is_empty() {
            details.push(MatchIssue::BuyerBudgetTooLow);
        }
        if all_sellers.is_empty() {
            details.push(MatchIssue::NoSeller);
        } else if sellers.is_empty() {
            details.push(MatchIssue::SellerPriceTooHigh);
        }
        debug!("{} ({}) unmatched as pivot: {:?}", pivot.name, pivot.id, details);
        statuses[pivot_idx].match_details = details;
    }

    let outcome = TriadOutcome { triads, statuses };
    info!(
        "Formed {} triads among {} traders: {} ready, {} partial, {} waiting",
        outcome.triads.len(),
        traders.len(),
        outcome.count(Readiness::Ready),
        outcome.count(Readiness::Partial),
        outcome.count(Readiness::Waiting)
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{generate_ranged_traders, PriceRange};
    use crate::matching::selector::{RandomSelector, RoundRobinSelector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn trader(id: &str, has: &str, wants: &str, min: i64, max: i64) -> RangedTrader {
        RangedTrader::new(id, id, has, wants, PriceRange::new(min, max)).unwrap()
    }

    #[test]
    fn test_simple_triad() {
        let traders = vec![
            trader("pivot", "BMW", "Audi", 100, 200),
            trader("buyer", "Ford", "BMW", 150, 250),
            trader("seller", "Audi", "Opel", 120, 180),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());

        assert_eq!(outcome.triads.len(), 1);
        let triad = &outcome.triads[0];
        assert_eq!(triad.id, "triad-1");
        assert_eq!(triad.buyer.id.as_str(), "buyer");
        assert_eq!(triad.pivot.id.as_str(), "pivot");
        assert_eq!(triad.seller.id.as_str(), "seller");

        let pivot = outcome.status(&"pivot".into()).unwrap();
        assert!(pivot.is_pivot);
        assert_eq!(pivot.readiness(), Readiness::Ready);
        let buyer = outcome.status(&"buyer".into()).unwrap();
        assert!(buyer.is_buyer && !buyer.is_pivot);
        assert_eq!(buyer.readiness(), Readiness::Partial);
        assert_eq!(buyer.match_details, vec![MatchIssue::NoBuyer]);
    }

    #[test]
    fn test_seller_price_too_high() {
        // Pivot can pay at most 100; every seller asks at least 150
        let traders = vec![
            trader("pivot", "BMW", "Audi", 50, 100),
            trader("buyer", "Ford", "BMW", 60, 300),
            trader("s1", "Audi", "Kia", 150, 200),
            trader("s2", "Audi", "Kia", 180, 220),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());

        assert!(outcome.triads.is_empty());
        let pivot = outcome.status(&"pivot".into()).unwrap();
        assert_eq!(pivot.match_details, vec![MatchIssue::SellerPriceTooHigh]);
        assert_eq!(pivot.readiness(), Readiness::Waiting);
    }

    #[test]
    fn test_both_sides_fail_independently() {
        let traders = vec![
            trader("pivot", "BMW", "Audi", 500, 600),
            trader("cheap-buyer", "Ford", "BMW", 100, 200),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());
        let pivot = outcome.status(&"pivot".into()).unwrap();
        assert_eq!(pivot.match_details, vec![MatchIssue::BuyerBudgetTooLow, MatchIssue::NoSeller]);
    }

    #[test]
    fn test_budget_bounds_are_inclusive() {
        let traders = vec![
            trader("pivot", "BMW", "Audi", 100, 200),
            trader("buyer", "Ford", "BMW", 50, 100),
            trader("seller", "Audi", "Opel", 200, 300),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());
        assert_eq!(outcome.triads.len(), 1);
    }

    #[test]
    fn test_counterparts_are_reused() {
        // Two pivots own BMW and want Audi; one buyer and one seller serve both
        let traders = vec![
            trader("p1", "BMW", "Audi", 100, 200),
            trader("p2", "BMW", "Audi", 100, 200),
            trader("buyer", "Ford", "BMW", 100, 200),
            trader("seller", "Audi", "Kia", 100, 200),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());

        assert_eq!(outcome.triads.len(), 2);
        assert_eq!(outcome.status(&"buyer".into()).unwrap().triad_count, 2);
        assert_eq!(outcome.status(&"seller".into()).unwrap().triad_count, 2);
        assert_eq!(outcome.status(&"p1".into()).unwrap().triad_count, 1);
    }

    #[test]
    fn test_round_robin_spreads_buyers() {
        let traders = vec![
            trader("p1", "BMW", "Audi", 100, 200),
            trader("p2", "BMW", "Audi", 100, 200),
            trader("b1", "Ford", "BMW", 100, 200),
            trader("b2", "Opel", "BMW", 100, 200),
            trader("s", "Audi", "Kia", 100, 200),
        ];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());
        let buyers: Vec<&str> = outcome.triads.iter().map(|t| t.buyer.id.as_str()).collect();
        assert_eq!(buyers, vec!["b1", "b2"]);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut rng = StdRng::seed_from_u64(2024);
        let traders = generate_ranged_traders(100, &mut rng);

        let first = find_trade_triads(&traders, &mut RandomSelector::seeded(9));
        let second = find_trade_triads(&traders, &mut RandomSelector::seeded(9));
        assert_eq!(first, second);
        assert_eq!(first.statuses.len(), 100);

        // Each trader pivots at most once; triad counts add up to three per triad
        let total: usize = first.statuses.iter().map(|s| s.triad_count).sum();
        assert_eq!(total, first.triads.len() * 3);
        for triad in &first.triads {
            assert_eq!(triad.buyer.wants_item, triad.pivot.has_item);
            assert_eq!(triad.seller.has_item, triad.pivot.wants_item);
            assert!(triad.buyer.price_range.max >= triad.pivot.price_range.min);
            assert!(triad.pivot.price_range.max >= triad.seller.price_range.min);
        }
        let pivots = first.statuses.iter().filter(|s| s.is_pivot).count();
        assert_eq!(pivots, first.triads.len());
    }

    #[test]
    fn test_empty_roster() {
        let outcome = find_trade_triads(&[], &mut RoundRobinSelector::new());
        assert_eq!(outcome, TriadOutcome::default());
    }
}

//! Trade Cycle Finder
//!
//! Enumerates every simple cycle of the wants graph with a DFS from each
//! trader, the same way a path-tracking cycle search over a token graph works:
//! - a path closes when it steps back onto its start with ≥ 2 traders
//! - a path that steps onto any other trader already on it is abandoned
//! - cycles already recorded under the same identity key are skipped
//!
//! The search is exponential in the worst case. Rosters are expected to hold
//! tens of traders; `max_len` bounds the search for anything larger.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use super::settlement::{calculate_cash_flow, CashFlow, Settlement, Trade};
use crate::market::{Money, Trader, TraderId, WantGraph};

/// What makes two discovered cycles "the same".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleIdentity {
    /// Same set of traders, whatever the order. The first ordering found wins.
    #[default]
    Members,
    /// Same ordering up to rotation; A→B→C→A and A→C→B→A are distinct.
    Rotation,
}

impl fmt::Display for CycleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleIdentity::Members => write!(f, "members"),
            CycleIdentity::Rotation => write!(f, "rotation"),
        }
    }
}

impl FromStr for CycleIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "members" | "set" => Ok(CycleIdentity::Members),
            "rotation" | "ordered" => Ok(CycleIdentity::Rotation),
            other => Err(format!("unknown cycle identity: {other}")),
        }
    }
}

/// A closed loop of traders in item-flow order: trader `i` receives the item
/// of trader `i-1`, and the first trader receives from the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeCycle {
    pub traders: Vec<Trader>,
    pub trades: Vec<Trade>,
    pub cash_flow: Vec<CashFlow>,
}

impl TradeCycle {
    /// Build a cycle and settle it. `traders` must be in item-flow order.
    pub fn new(traders: Vec<Trader>) -> Self {
        let Settlement { trades, cash_flow } = calculate_cash_flow(&traders);
        Self { traders, trades, cash_flow }
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }

    pub fn ids(&self) -> Vec<&TraderId> {
        self.traders.iter().map(Trader::id).collect()
    }

    /// Identity key under the given rule
    pub fn key(&self, identity: CycleIdentity) -> String {
        cycle_key(&self.ids(), identity)
    }

    /// Every trader receives exactly the item it wants from its predecessor,
    /// and nobody appears twice.
    pub fn is_valid(&self) -> bool {
        let n = self.traders.len();
        if n < 2 {
            return false;
        }
        let unique: HashSet<_> = self.ids().into_iter().collect();
        if unique.len() != n {
            return false;
        }
        (0..n).all(|i| {
            let previous = &self.traders[(i + n - 1) % n];
            self.traders[i].wants_item() == previous.has_item()
        })
    }

    pub fn total_cash(&self) -> Money {
        self.cash_flow.iter().map(|flow| flow.amount).sum()
    }

    /// "Serap → Bayram → Ufuk → Serap", following the items
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = self.traders.iter().map(Trader::name).collect();
        if let Some(first) = names.first().copied() {
            names.push(first);
        }
        names.join(" → ")
    }
}

/// Ids of a cycle in canonical order: sorted for `Members`, rotated so the
/// smallest id leads for `Rotation`. Two cycles are duplicates iff these match.
pub fn canonical_ids<'a>(ids: &[&'a TraderId], identity: CycleIdentity) -> Vec<&'a TraderId> {
    match identity {
        CycleIdentity::Members => {
            let mut sorted = ids.to_vec();
            sorted.sort_unstable();
            sorted
        }
        CycleIdentity::Rotation => {
            let start = ids
                .iter()
                .enumerate()
                .min_by_key(|(_, id)| **id)
                .map(|(i, _)| i)
                .unwrap_or(0);
            ids[start..].iter().chain(&ids[..start]).copied().collect()
        }
    }
}

/// Display form of [`canonical_ids`], e.g. `a-b-c`. Ids may contain dashes
/// themselves, so dedup never compares these strings.
pub fn cycle_key(ids: &[&TraderId], identity: CycleIdentity) -> String {
    canonical_ids(ids, identity)
        .into_iter()
        .map(TraderId::as_str)
        .collect::<Vec<_>>()
        .join("-")
}

/// DFS cycle enumerator over the wants graph
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleFinder {
    identity: CycleIdentity,
    max_len: Option<usize>,
}

impl CycleFinder {
    pub fn new(identity: CycleIdentity, max_len: Option<usize>) -> Self {
        Self { identity, max_len }
    }

    /// Find all cycles, in discovery order (start trader order × edge order).
    pub fn find_cycles(&self, traders: &[Trader]) -> Vec<TradeCycle> {
        if traders.len() < 2 {
            return Vec::new();
        }

        let graph = WantGraph::from_traders(traders);
        let mut cycles = Vec::new();
        let mut seen_keys: HashSet<Vec<TraderId>> = HashSet::new();
        let mut path: Vec<NodeIndex> = Vec::with_capacity(traders.len());

        for &start in graph.nodes() {
            self.dfs_find_cycles(&graph, start, start, &mut path, &mut seen_keys, &mut cycles);
        }

        let total_cash: Money = cycles.iter().map(TradeCycle::total_cash).sum();
        info!(
            "Found {} unique trade cycles among {} traders ({} cash to settle)",
            cycles.len(),
            traders.len(),
            crate::market::format_amount(total_cash)
        );

        cycles
    }

    fn dfs_find_cycles(
        &self,
        graph: &WantGraph<'_>,
        start: NodeIndex,
        current: NodeIndex,
        path: &mut Vec<NodeIndex>,
        seen_keys: &mut HashSet<Vec<TraderId>>,
        cycles: &mut Vec<TradeCycle>,
    ) {
        if current == start && path.len() >= 2 {
            self.record_cycle(graph, path, seen_keys, cycles);
            return;
        }

        // Don't revisit nodes (returning to start is handled above)
        if path.contains(&current) {
            return;
        }

        if self.max_len.is_some_and(|max| path.len() >= max) {
            return;
        }

        path.push(current);
        for next in graph.wanted_from(current) {
            self.dfs_find_cycles(graph, start, next, path, seen_keys, cycles);
        }
        path.pop();
    }

    fn record_cycle(
        &self,
        graph: &WantGraph<'_>,
        path: &[NodeIndex],
        seen_keys: &mut HashSet<Vec<TraderId>>,
        cycles: &mut Vec<TradeCycle>,
    ) {
        // The path follows wants (each trader wants the next one's item), so
        // items flow the other way. Reverse everything after the start.
        let mut flow: Vec<&Trader> = Vec::with_capacity(path.len());
        flow.push(graph.trader(path[0]));
        flow.extend(path[1..].iter().rev().map(|&node| graph.trader(node)));

        let ids: Vec<&TraderId> = flow.iter().map(|t| t.id()).collect();
        let key: Vec<TraderId> = canonical_ids(&ids, self.identity).into_iter().cloned().collect();
        if !seen_keys.insert(key) {
            return;
        }

        let cycle = TradeCycle::new(flow.into_iter().cloned().collect());
        debug!("Cycle {}: {}", cycles.len() + 1, cycle.path());
        cycles.push(cycle);
    }
}

/// Find all trade cycles with default settings (member-set identity, no cap).
pub fn find_cycles(traders: &[Trader]) -> Vec<TradeCycle> {
    CycleFinder::default().find_cycles(traders)
}

//! The Matcher
//!
//! Responsible for:
//! - Finding closed trade loops in the wants graph
//! - Settling each loop so every trader stays value-neutral
//! - Forming buyer → pivot → seller triads within price ranges

mod cycles;
mod selector;
mod settlement;
mod triads;

pub use cycles::{canonical_ids, cycle_key, find_cycles, CycleFinder, CycleIdentity, TradeCycle};
pub use selector::{CounterpartSelector, RandomSelector, Role, RoundRobinSelector, SelectionMode};
pub use settlement::{calculate_cash_flow, CashFlow, Settlement, Trade};
pub use triads::{find_trade_triads, MatchIssue, Readiness, TradeTriad, TraderStatus, TriadOutcome};

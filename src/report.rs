//! Console reports for cycles, settlements and triads

use console::style;
use tracing::warn;

use crate::market::{format_amount, Trader, TraderId};
use crate::matching::{CashFlow, Readiness, TradeCycle, TradeTriad, TraderStatus, TriadOutcome};

/// How many triads and statuses to list before summarising the rest
const LIST_LIMIT: usize = 15;

fn name_in<'a>(traders: &'a [Trader], id: &'a TraderId) -> &'a str {
    traders
        .iter()
        .find(|t| t.id() == id)
        .map(Trader::name)
        .unwrap_or(id.as_str())
}

/// "Serap pays Ufuk 20 (reason)"
pub fn describe_flow(cycle: &TradeCycle, flow: &CashFlow) -> String {
    format!(
        "{} pays {} {}",
        name_in(&cycle.traders, &flow.from),
        name_in(&cycle.traders, &flow.to),
        format_amount(flow.amount)
    )
}

/// "Bayram → Serap → Ufuk", buyer to seller
pub fn describe_triad(triad: &TradeTriad) -> String {
    format!("{} → {} → {}", triad.buyer.name, triad.pivot.name, triad.seller.name)
}

/// Roles and issues for one trader, e.g. "pivot ×1, buyer ×2"
pub fn describe_status(status: &TraderStatus) -> String {
    let mut roles = Vec::new();
    if status.is_pivot {
        roles.push("pivot");
    }
    if status.is_buyer {
        roles.push("buyer");
    }
    if status.is_seller {
        roles.push("seller");
    }
    let mut parts = Vec::new();
    if !roles.is_empty() {
        parts.push(format!("{} in {} triads", roles.join("/"), status.triad_count));
    }
    if !status.match_details.is_empty() {
        let issues: Vec<String> = status.match_details.iter().map(|i| i.to_string()).collect();
        parts.push(issues.join(", "));
    }
    parts.join(" | ")
}

/// "has BMW wants Opel | 50,000 km good | 918,000 | budget +0"
pub fn describe_trader(trader: &Trader) -> String {
    let usage = i64::try_from(trader.usage()).unwrap_or(i64::MAX);
    let budget = if trader.budget() < 0 {
        format_amount(trader.budget())
    } else {
        format!("+{}", format_amount(trader.budget()))
    };
    format!(
        "has {} wants {} | {} km {} | {} | budget {}",
        trader.has_item(),
        trader.wants_item(),
        format_amount(usage),
        trader.condition(),
        format_amount(trader.price()),
        budget
    )
}

pub fn print_traders(traders: &[Trader]) {
    println!();
    println!("{}", style("═══ TRADERS ═══").yellow().bold());
    println!();
    for trader in traders {
        println!(
            "  {:>4} {:<12} {}",
            style(trader.id()).dim(),
            trader.name(),
            style(describe_trader(trader)).cyan()
        );
    }
}

pub fn print_cycles(cycles: &[TradeCycle]) {
    println!();
    println!("{}", style("═══ TRADE CYCLES ═══").yellow().bold());
    println!();

    if cycles.is_empty() {
        warn!("No trade cycles found");
        println!("  {}", style("No closed trade loops in this roster.").yellow());
        return;
    }

    for (i, cycle) in cycles.iter().enumerate() {
        let status = if cycle.is_valid() {
            style("✓ valid").green()
        } else {
            style("✗ invalid").red()
        };
        println!("  {}. {} | {} traders", i + 1, status, cycle.len());
        println!("     Path: {}", style(cycle.path()).cyan());

        for trade in &cycle.trades {
            println!(
                "     {} receives {} from {}, gives {} to {} ({:+})",
                name_in(&cycle.traders, &trade.trader),
                trade.item_received,
                name_in(&cycle.traders, &trade.from),
                trade.item_given,
                name_in(&cycle.traders, &trade.to),
                trade.cash_amount
            );
        }

        if cycle.cash_flow.is_empty() {
            println!("     {}", style("Even swap, no cash needed").green());
        }
        for flow in &cycle.cash_flow {
            println!("     {} {}", style("$").magenta(), style(describe_flow(cycle, flow)).magenta());
            println!("       {}", style(&flow.reason).dim());
        }
        println!();
    }
}

pub fn print_triads(outcome: &TriadOutcome) {
    println!();
    println!("{}", style("═══ TRADE TRIADS ═══").yellow().bold());
    println!();
    println!(
        "Formed {} triads: {} ready, {} partial, {} waiting",
        outcome.triads.len(),
        outcome.count(Readiness::Ready),
        outcome.count(Readiness::Partial),
        outcome.count(Readiness::Waiting)
    );
    println!();

    for triad in outcome.triads.iter().take(LIST_LIMIT) {
        println!("  {} {}", style(&triad.id).dim(), style(describe_triad(triad)).cyan());
        println!(
            "     {} wants {} ({}) | {} wants {} ({})",
            triad.buyer.name,
            triad.pivot.has_item,
            triad.buyer.price_range,
            triad.pivot.name,
            triad.seller.has_item,
            triad.pivot.price_range
        );
    }
    if outcome.triads.len() > LIST_LIMIT {
        println!("  ... and {} more triads", outcome.triads.len() - LIST_LIMIT);
    }
}

pub fn print_statuses(outcome: &TriadOutcome) {
    println!();
    println!("{}", style("═══ TRADER STATUS ═══").yellow().bold());
    println!();

    for status in outcome.statuses.iter().take(LIST_LIMIT) {
        let readiness = match status.readiness() {
            Readiness::Ready => style(format!("✓ {}", Readiness::Ready)).green(),
            Readiness::Partial => style(format!("○ {}", Readiness::Partial)).yellow(),
            Readiness::Waiting => style(format!("✗ {}", Readiness::Waiting)).red(),
        };
        println!(
            "  {:<12} {:<18} {}",
            status.trader.name,
            readiness,
            describe_status(status)
        );
    }
    if outcome.statuses.len() > LIST_LIMIT {
        println!("  ... and {} more traders", outcome.statuses.len() - LIST_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{demo_roster, PriceRange, PricingModel, RangedTrader, TraderDraft};
    use crate::matching::{find_cycles, find_trade_triads, RoundRobinSelector};

    #[test]
    fn test_describe_flow_uses_names() {
        let pricing = PricingModel::default();
        let traders = vec![
            TraderDraft::new("a", "Ayla", "X", "Y").base_price(100).condition(crate::market::Condition::Excellent),
            TraderDraft::new("b", "Berk", "Y", "X").base_price(120).condition(crate::market::Condition::Excellent),
        ]
        .into_iter()
        .map(|d| d.price(&pricing).unwrap())
        .collect::<Vec<_>>();

        let cycles = find_cycles(&traders);
        assert_eq!(cycles.len(), 1);
        let flow = &cycles[0].cash_flow[0];
        assert_eq!(describe_flow(&cycles[0], flow), "Ayla pays Berk 20");
    }

    #[test]
    fn test_describe_triad_and_status() {
        let make = |id: &str, has: &str, wants: &str| {
            RangedTrader::new(id, id.to_uppercase(), has, wants, PriceRange::new(100, 200)).unwrap()
        };
        let traders = vec![make("p", "BMW", "Audi"), make("b", "Ford", "BMW"), make("s", "Audi", "Kia")];
        let outcome = find_trade_triads(&traders, &mut RoundRobinSelector::new());

        assert_eq!(describe_triad(&outcome.triads[0]), "B → P → S");
        assert_eq!(describe_status(&outcome.statuses[0]), "pivot in 1 triads");
        assert_eq!(
            describe_status(&outcome.statuses[1]),
            "buyer in 1 triads | no buyer for item"
        );
    }

    #[test]
    fn test_describe_trader_shows_budget_and_huge_usage() {
        let pricing = PricingModel::default();
        let trader = TraderDraft::new("1", "Serap", "BMW", "Opel")
            .usage(50_000)
            .condition(crate::market::Condition::Good)
            .budget(-15_000)
            .price(&pricing)
            .unwrap();
        assert_eq!(describe_trader(&trader), "has BMW wants Opel | 50,000 km good | 918,000 | budget -15,000");

        let worn = TraderDraft::new("2", "Bayram", "Audi", "BMW").usage(u64::MAX).price(&pricing).unwrap();
        let line = describe_trader(&worn);
        assert!(line.contains("9,223,372,036,854,775,807 km"), "{line}");
        assert!(line.ends_with("budget +0"), "{line}");
    }

    #[test]
    fn test_printing_demo_does_not_panic() {
        let traders = demo_roster().priced_traders(&PricingModel::default()).unwrap();
        let cycles = find_cycles(&traders);
        print_traders(&traders);
        print_cycles(&cycles);
        print_cycles(&[]);
        print_triads(&TriadOutcome::default());
        print_statuses(&TriadOutcome::default());
    }
}

//! The Market
//!
//! Responsible for:
//! - Pricing items from the catalog (base price × usage × condition)
//! - Building validated traders and rosters
//! - Turning a trader list into the wants graph

pub mod catalog;
mod graph;
mod pricing;
pub mod roster;
mod trader;

/// Whole currency units
pub type Money = i64;

pub use catalog::Condition;
pub use graph::WantGraph;
pub use pricing::PricingModel;
pub use roster::{demo_roster, generate_drafts, generate_ranged_traders, Roster};
pub use trader::{PriceRange, RangedTrader, Trader, TraderDraft, TraderId};

/// Format an amount with thousands separators, e.g. `-1,234,500`
pub fn format_amount(amount: Money) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_000), "1,000");
        assert_eq!(format_amount(1_234_500), "1,234,500");
        assert_eq!(format_amount(-20), "-20");
        assert_eq!(format_amount(-352_800), "-352,800");
    }
}

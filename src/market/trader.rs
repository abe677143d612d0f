//! Trader model
//!
//! Two flavours share the same identity fields:
//! - [`Trader`] carries a derived price and takes part in trade cycles
//! - [`RangedTrader`] carries an affordability band and takes part in triads

use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::Condition;
use super::pricing::PricingModel;
use super::Money;
use crate::error::{Result, RosterError};

/// Stable trader identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraderId(String);

impl TraderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TraderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TraderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

fn require(id: &str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RosterError::EmptyField { id: id.to_string(), field });
    }
    Ok(())
}

// ============================================
// PRICED TRADER (cycle detection)
// ============================================

/// Unpriced trader record, as read from a roster file or form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderDraft {
    pub id: String,
    pub name: String,
    pub has_item: String,
    pub wants_item: String,
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub condition: Condition,
    /// Overrides the catalog base price for `has_item`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Money>,
    /// Declared extra cash; shown in reports, never used by settlement
    #[serde(default)]
    pub budget: Money,
}

impl TraderDraft {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        has_item: impl Into<String>,
        wants_item: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            has_item: has_item.into(),
            wants_item: wants_item.into(),
            usage: 0,
            condition: Condition::default(),
            base_price: None,
            budget: 0,
        }
    }

    pub fn usage(mut self, usage: u64) -> Self {
        self.usage = usage;
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn base_price(mut self, base_price: Money) -> Self {
        self.base_price = Some(base_price);
        self
    }

    pub fn budget(mut self, budget: Money) -> Self {
        self.budget = budget;
        self
    }

    /// Validate the record and price it.
    pub fn price(self, pricing: &PricingModel) -> Result<Trader> {
        require(&self.id, "id", &self.id)?;
        require(&self.id, "name", &self.name)?;
        require(&self.id, "has_item", &self.has_item)?;
        require(&self.id, "wants_item", &self.wants_item)?;

        let id = TraderId::from(self.id);
        let base_price = match self.base_price {
            Some(base) if base < 0 => {
                return Err(RosterError::NegativeBasePrice { id, base_price: base })
            }
            Some(base) => base,
            None => pricing.base_price(&self.has_item),
        };
        let price = pricing.price_from_base(base_price, self.usage, self.condition);

        Ok(Trader {
            id,
            name: self.name,
            has_item: self.has_item,
            wants_item: self.wants_item,
            usage: self.usage,
            condition: self.condition,
            base_price,
            price,
            budget: self.budget,
        })
    }
}

/// A priced trader. `price` always reflects `(base_price, condition, usage)`:
/// the inputs are only reachable through setters that reprice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trader {
    id: TraderId,
    name: String,
    has_item: String,
    wants_item: String,
    usage: u64,
    condition: Condition,
    base_price: Money,
    price: Money,
    budget: Money,
}

impl Trader {
    pub fn id(&self) -> &TraderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_item(&self) -> &str {
        &self.has_item
    }

    pub fn wants_item(&self) -> &str {
        &self.wants_item
    }

    pub fn usage(&self) -> u64 {
        self.usage
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Extra cash the trader will pay (positive) or wants to receive (negative).
    /// Informational only: settlement is driven by item prices alone.
    pub fn budget(&self) -> Money {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Money) {
        self.budget = budget;
    }

    pub fn set_usage(&mut self, usage: u64, pricing: &PricingModel) {
        self.usage = usage;
        self.reprice(pricing);
    }

    pub fn set_condition(&mut self, condition: Condition, pricing: &PricingModel) {
        self.condition = condition;
        self.reprice(pricing);
    }

    pub fn set_base_price(&mut self, base_price: Money, pricing: &PricingModel) -> Result<()> {
        if base_price < 0 {
            return Err(RosterError::NegativeBasePrice { id: self.id.clone(), base_price });
        }
        self.base_price = base_price;
        self.reprice(pricing);
        Ok(())
    }

    /// Swap the owned item; the base price follows the new category.
    pub fn set_has_item(&mut self, has_item: impl Into<String>, pricing: &PricingModel) -> Result<()> {
        let has_item = has_item.into();
        require(self.id.as_str(), "has_item", &has_item)?;
        self.base_price = pricing.base_price(&has_item);
        self.has_item = has_item;
        self.reprice(pricing);
        Ok(())
    }

    pub fn set_wants_item(&mut self, wants_item: impl Into<String>) -> Result<()> {
        let wants_item = wants_item.into();
        require(self.id.as_str(), "wants_item", &wants_item)?;
        self.wants_item = wants_item;
        Ok(())
    }

    fn reprice(&mut self, pricing: &PricingModel) {
        self.price = pricing.price_from_base(self.base_price, self.usage, self.condition);
    }

    /// Back to an editable record, keeping the effective base price.
    pub fn to_draft(&self) -> TraderDraft {
        TraderDraft {
            id: self.id.to_string(),
            name: self.name.clone(),
            has_item: self.has_item.clone(),
            wants_item: self.wants_item.clone(),
            usage: self.usage,
            condition: self.condition,
            base_price: Some(self.base_price),
            budget: self.budget,
        }
    }
}

// ============================================
// RANGED TRADER (triad matching)
// ============================================

/// Affordability band, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    pub fn new(min: Money, max: Money) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedTrader {
    pub id: TraderId,
    pub name: String,
    pub has_item: String,
    pub wants_item: String,
    pub price_range: PriceRange,
}

impl RangedTrader {
    pub fn new(
        id: impl Into<TraderId>,
        name: impl Into<String>,
        has_item: impl Into<String>,
        wants_item: impl Into<String>,
        price_range: PriceRange,
    ) -> Result<Self> {
        let trader = Self {
            id: id.into(),
            name: name.into(),
            has_item: has_item.into(),
            wants_item: wants_item.into(),
            price_range,
        };
        trader.validate()?;
        Ok(trader)
    }

    /// Fields are public for deserialization, so rosters re-check them here.
    pub fn validate(&self) -> Result<()> {
        let id = self.id.as_str();
        require(id, "id", id)?;
        require(id, "name", &self.name)?;
        require(id, "has_item", &self.has_item)?;
        require(id, "wants_item", &self.wants_item)?;
        if self.price_range.min > self.price_range.max {
            return Err(RosterError::InvertedPriceRange {
                id: self.id.clone(),
                min: self.price_range.min,
                max: self.price_range.max,
            });
        }
        Ok(())
    }

    /// Can this trader pay at least what `seller` asks at minimum?
    pub fn can_afford(&self, seller: &RangedTrader) -> bool {
        self.price_range.max >= seller.price_range.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_prices_from_catalog() {
        let pricing = PricingModel::default();
        let trader = TraderDraft::new("1", "Serap", "BMW", "Opel")
            .usage(50_000)
            .condition(Condition::Good)
            .price(&pricing)
            .unwrap();

        assert_eq!(trader.base_price(), 1_200_000);
        assert_eq!(trader.price(), 918_000);
        assert_eq!(trader.id().as_str(), "1");
    }

    #[test]
    fn test_base_price_override() {
        let pricing = PricingModel::default();
        let trader = TraderDraft::new("a", "A", "X", "Y")
            .base_price(100)
            .condition(Condition::Excellent)
            .price(&pricing)
            .unwrap();
        assert_eq!(trader.price(), 100);
    }

    #[test]
    fn test_mutation_reprices() {
        let pricing = PricingModel::default();
        let mut trader = TraderDraft::new("1", "Serap", "BMW", "Opel")
            .condition(Condition::Excellent)
            .price(&pricing)
            .unwrap();
        assert_eq!(trader.price(), 1_200_000);

        trader.set_usage(100_000, &pricing);
        assert_eq!(trader.price(), 960_000);

        trader.set_condition(Condition::Poor, &pricing);
        assert_eq!(trader.price(), 480_000);

        trader.set_has_item("Dacia", &pricing).unwrap();
        assert_eq!(trader.base_price(), 400_000);
        assert_eq!(trader.price(), 160_000);

        trader.set_base_price(1_000, &pricing).unwrap();
        assert_eq!(trader.price(), 400);
        assert!(trader.set_base_price(-5, &pricing).is_err());
        assert_eq!(trader.price(), 400);
    }

    #[test]
    fn test_empty_fields_rejected() {
        let pricing = PricingModel::default();
        let err = TraderDraft::new("7", "  ", "BMW", "Opel").price(&pricing).unwrap_err();
        assert!(matches!(err, RosterError::EmptyField { field: "name", .. }));

        let err = TraderDraft::new("", "Nobody", "BMW", "Opel").price(&pricing).unwrap_err();
        assert!(matches!(err, RosterError::EmptyField { field: "id", .. }));
    }

    #[test]
    fn test_draft_round_trip_keeps_price() {
        let pricing = PricingModel::default();
        let trader = TraderDraft::new("3", "Ufuk", "Opel", "Audi")
            .usage(80_000)
            .condition(Condition::Fair)
            .budget(25_000)
            .price(&pricing)
            .unwrap();
        let again = trader.to_draft().price(&pricing).unwrap();
        assert_eq!(trader, again);
    }

    #[test]
    fn test_ranged_trader_validation() {
        assert!(RangedTrader::new("t1", "Ali", "BMW", "Audi", PriceRange::new(10, 20)).is_ok());
        let err = RangedTrader::new("t2", "Veli", "BMW", "Audi", PriceRange::new(30, 20)).unwrap_err();
        assert!(matches!(err, RosterError::InvertedPriceRange { min: 30, max: 20, .. }));
    }

    #[test]
    fn test_can_afford_is_inclusive() {
        let buyer = RangedTrader::new("b", "B", "Ford", "BMW", PriceRange::new(50, 100)).unwrap();
        let seller = RangedTrader::new("s", "S", "BMW", "Ford", PriceRange::new(100, 150)).unwrap();
        assert!(buyer.can_afford(&seller));

        let pricey = RangedTrader::new("p", "P", "BMW", "Ford", PriceRange::new(101, 150)).unwrap();
        assert!(!buyer.can_afford(&pricey));
    }
}

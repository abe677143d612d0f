//! Item valuation
//!
//! `price = round(base × usage_multiplier × condition_multiplier)`
//!
//! Unknown categories fall back to a fixed base price and unknown conditions
//! to a fixed multiplier, so valuation never fails.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::{self, Condition, FALLBACK_BASE_PRICE, FALLBACK_CONDITION_MULTIPLIER};
use super::Money;

/// Tunable constants of the valuation formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingModel {
    /// Usage units per depreciation step (10,000 km)
    pub usage_step: f64,

    /// Value lost per step (0.02 = 2%)
    pub depreciation_per_step: f64,

    /// Usage multiplier never drops below this (0.30 = 30%)
    pub usage_floor: f64,

    /// Base price for categories the catalog does not know
    pub fallback_base_price: Money,

    /// Multiplier for unrated conditions
    pub fallback_condition_multiplier: f64,

    /// Extra or overriding base prices, consulted before the catalog
    pub extra_base_prices: BTreeMap<String, Money>,
}

impl PricingModel {
    /// Base price for a category
    pub fn base_price(&self, category: &str) -> Money {
        self.extra_base_prices
            .get(category)
            .copied()
            .or_else(|| catalog::base_price(category))
            .unwrap_or(self.fallback_base_price)
    }

    /// Depreciation factor for accumulated usage, clamped to the floor.
    pub fn usage_multiplier(&self, usage: u64) -> f64 {
        let steps = usage as f64 / self.usage_step;
        (1.0 - steps * self.depreciation_per_step).max(self.usage_floor)
    }

    pub fn condition_multiplier(&self, condition: Condition) -> f64 {
        match condition {
            Condition::Unrated => self.fallback_condition_multiplier,
            tier => tier.multiplier(),
        }
    }

    /// Final price for a category, looking its base price up first.
    pub fn price(&self, category: &str, usage: u64, condition: Condition) -> Money {
        self.price_from_base(self.base_price(category), usage, condition)
    }

    /// Final price from an explicit base price.
    pub fn price_from_base(&self, base_price: Money, usage: u64, condition: Condition) -> Money {
        let value =
            base_price as f64 * self.usage_multiplier(usage) * self.condition_multiplier(condition);
        value.round() as Money
    }

    /// Lowest price any item with this base can reach
    pub fn price_floor(&self, base_price: Money) -> Money {
        let min_condition = Condition::min_multiplier().min(self.fallback_condition_multiplier);
        (base_price as f64 * self.usage_floor * min_condition).round() as Money
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.usage_step > 0.0 && self.usage_step.is_finite()) {
            return Err(eyre::eyre!(
                "USAGE_STEP must be positive (currently {})",
                self.usage_step
            ));
        }
        if !(0.0..=1.0).contains(&self.depreciation_per_step) {
            return Err(eyre::eyre!(
                "DEPRECIATION_PER_STEP must be between 0 and 1 (currently {})",
                self.depreciation_per_step
            ));
        }
        if !(self.usage_floor > 0.0 && self.usage_floor <= 1.0) {
            return Err(eyre::eyre!(
                "USAGE_FLOOR must be in (0, 1] (currently {})",
                self.usage_floor
            ));
        }
        if !(self.fallback_condition_multiplier > 0.0 && self.fallback_condition_multiplier <= 1.0) {
            return Err(eyre::eyre!(
                "FALLBACK_CONDITION_MULTIPLIER must be in (0, 1] (currently {})",
                self.fallback_condition_multiplier
            ));
        }
        if self.fallback_base_price < 0 {
            return Err(eyre::eyre!("FALLBACK_BASE_PRICE must not be negative"));
        }
        if let Some((name, price)) = self.extra_base_prices.iter().find(|(_, p)| **p < 0) {
            return Err(eyre::eyre!("Base price for {} is negative ({})", name, price));
        }
        Ok(())
    }
}

impl Default for PricingModel {
    fn default() -> Self {
        Self {
            usage_step: 10_000.0,
            depreciation_per_step: 0.02,
            usage_floor: 0.30,
            fallback_base_price: FALLBACK_BASE_PRICE,
            fallback_condition_multiplier: FALLBACK_CONDITION_MULTIPLIER,
            extra_base_prices: BTreeMap::new(),
        }
    }
}

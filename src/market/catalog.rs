//! Item catalog for the barter market
//!
//! Includes:
//! - Base prices for the car brands traders swap
//! - Condition tiers and their value multipliers
//! - The model line-up and name pool used by the roster generator

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::Money;

/// Base price for any category missing from the catalog
pub const FALLBACK_BASE_PRICE: Money = 500_000;

/// Multiplier for a condition label outside the known tiers
pub const FALLBACK_CONDITION_MULTIPLIER: f64 = 0.70;

// ============================================
// BASE PRICES (average market value, whole currency units)
// ============================================

const BASE_PRICES: [(&str, Money); 23] = [
    ("BMW", 1_200_000),
    ("Audi", 1_100_000),
    ("Mercedes", 1_300_000),
    ("Opel", 600_000),
    ("Ford", 700_000),
    ("Toyota", 800_000),
    ("Honda", 750_000),
    ("Volkswagen", 650_000),
    ("Renault", 550_000),
    ("Peugeot", 600_000),
    ("Togg", 2_000_000),
    ("Tesla", 2_500_000),
    ("Hyundai", 600_000),
    ("Kia", 550_000),
    ("Fiat", 500_000),
    ("Dacia", 400_000),
    ("Skoda", 650_000),
    ("Seat", 600_000),
    ("Nissan", 700_000),
    ("Mazda", 750_000),
    ("Volvo", 900_000),
    ("Mini", 800_000),
    ("Citroen", 550_000),
];

lazy_static! {
    static ref BASE_PRICE_TABLE: HashMap<&'static str, Money> = BASE_PRICES.iter().copied().collect();
}

/// Catalog base price for a category, if the category is known
pub fn base_price(category: &str) -> Option<Money> {
    BASE_PRICE_TABLE.get(category).copied()
}

/// All categories with a catalog price, in catalog order
pub fn categories() -> impl Iterator<Item = &'static str> {
    BASE_PRICES.iter().map(|(name, _)| *name)
}

/// Models offered by the random roster generator. The first five are the
/// "popular" ones that generated traders are biased toward wanting.
pub const GENERATOR_MODELS: [&str; 10] = [
    "BMW",
    "Audi",
    "Mercedes",
    "Toyota",
    "Honda",
    "Ford",
    "Volkswagen",
    "Hyundai",
    "Nissan",
    "Opel",
];

/// Display names handed out by the roster generator
pub const GENERATOR_NAMES: [&str; 50] = [
    "Ahmet", "Mehmet", "Ali", "Veli", "Can", "Cem", "Burak", "Emre", "Kerem", "Onur",
    "Ayse", "Fatma", "Zeynep", "Elif", "Selin", "Deniz", "Ece", "Ceren", "Dilara", "Sude",
    "Kemal", "Mustafa", "Hasan", "Yusuf", "Omer", "Osman", "Salih", "Gul", "Sema", "Nur",
    "Aylin", "Burcu", "Gizem", "Melis", "Pinar", "Tugba", "Baris", "Efe", "Furkan", "Hakan",
    "Kaan", "Levent", "Mert", "Okan", "Poyraz", "Serkan", "Tolga", "Umut", "Volkan", "Yasin",
];

// ============================================
// CONDITION TIERS
// ============================================

/// Qualitative condition of a traded item.
///
/// Parsing never fails: labels outside the four tiers become [`Condition::Unrated`],
/// which prices with [`FALLBACK_CONDITION_MULTIPLIER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Unrated,
}

impl Condition {
    pub const TIERS: [Condition; 4] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    /// Value multiplier for this tier
    pub fn multiplier(self) -> f64 {
        match self {
            Condition::Excellent => 1.0,
            Condition::Good => 0.85,
            Condition::Fair => 0.70,
            Condition::Poor => 0.50,
            Condition::Unrated => FALLBACK_CONDITION_MULTIPLIER,
        }
    }

    /// Smallest multiplier any condition can produce
    pub fn min_multiplier() -> f64 {
        Self::TIERS
            .iter()
            .map(|c| c.multiplier())
            .fold(FALLBACK_CONDITION_MULTIPLIER, f64::min)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
            Condition::Unrated => "unrated",
        }
    }
}

impl FromStr for Condition {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accepts the Turkish tier labels too. U+0307 is left behind when "İ" is lowercased
        let label = s.trim().to_lowercase().replace('\u{307}', "");
        let condition = match label.as_str() {
            "excellent" | "mükemmel" | "mukemmel" => Condition::Excellent,
            "good" | "iyi" => Condition::Good,
            "fair" | "orta" => Condition::Fair,
            "poor" | "kötü" | "kotu" => Condition::Poor,
            _ => Condition::Unrated,
        };
        Ok(condition)
    }
}

impl From<String> for Condition {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(condition) => condition,
            Err(never) => match never {},
        }
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

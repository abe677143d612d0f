//! Errors raised while building traders and rosters.
//!
//! The matching algorithms themselves never fail; anything malformed is
//! rejected here, at construction time.

use std::path::PathBuf;

use thiserror::Error;

use crate::market::{Money, TraderId};

/// Convenient result alias for roster construction.
pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, Error)]
pub enum RosterError {
    /// A required text field was empty or whitespace.
    #[error("trader {id:?}: field `{field}` must not be empty")]
    EmptyField { id: String, field: &'static str },

    #[error("trader {id}: base price must not be negative (got {base_price})")]
    NegativeBasePrice { id: TraderId, base_price: Money },

    #[error("trader {id}: price range is inverted (min {min} > max {max})")]
    InvertedPriceRange { id: TraderId, min: Money, max: Money },

    /// Two traders in one roster share an id.
    #[error("duplicate trader id: {id}")]
    DuplicateId { id: TraderId },

    #[error("unsupported roster format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse TOML roster: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON roster: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

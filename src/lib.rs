//! Multi-party barter engine: trade cycles, cash settlement and pivot triads.

pub mod config;
pub mod error;
pub mod market;
pub mod matching;
pub mod report;

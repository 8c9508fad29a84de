//! Multi-country personal income tax estimation engine.
//!
//! This crate estimates income tax, social security and other levies for a
//! taxpayer in Portugal, Spain, France, the United Kingdom, Cyprus and Poland,
//! using per-year tax tables loaded from YAML, and compares the results in a
//! single display currency.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

//! Data layer for the store dashboard.
//!
//! Discovers and reads CSV report exports, classifies them by their columns,
//! normalizes them into typed records, reconciles currencies and aggregates
//! everything into the [`analysis::Dataset`] the UI renders.

pub mod aggregator;
pub mod analysis;
pub mod currency;
pub mod normalizer;
pub mod reader;
pub mod schema;

pub use dashboard_core as core;

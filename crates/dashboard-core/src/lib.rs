//! Shared types for the store dashboard.
//!
//! Record models, the error type, CLI settings, date/number coercion,
//! ISO country codes and display formatting used by the data and UI crates.

pub mod country;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};

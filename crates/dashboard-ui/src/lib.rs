//! Terminal UI layer for the store report dashboard.
//!
//! Themes, shared components and one render function per tab, plus the
//! [`app::App`] event loop that ties them to a [`dashboard_data::analysis::Dataset`].

pub mod app;
pub mod components;
pub mod country_view;
pub mod diagnostics_view;
pub mod quality_view;
pub mod table_view;
pub mod themes;

#[cfg(test)]
mod test_support;

pub use dashboard_core as core;

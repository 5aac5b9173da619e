//! Iguana population dashboard.
//!
//! Loads a monitoring spreadsheet, aggregates it (composition, sex
//! distribution, weight statistics, weight by age × sex, daily captures)
//! and serves the results as Plotly chart specifications over HTTP.

pub mod aggregate;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod server;

pub use config::DashboardConfig;
pub use error::{ConfigError, DataError};
pub use report::Report;

//! Report analytics for a civic issue-reporting platform.
//!
//! Turns a raw list of incident reports into the views the dashboards show:
//! status, severity, category and department breakdowns, a rolling daily
//! trend, city scoping, search with pagination, and a per-user impact score.
//! All analytics are pure functions over an immutable snapshot; only
//! [`loader`], [`config`] and [`output`] touch the filesystem.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod loader;
pub mod output;
pub mod score;
pub mod search;
pub mod trend;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};

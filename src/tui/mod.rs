//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the premium estimator screens:
//! - Applicant form with the estimate banner
//! - Prediction history with CSV/HTML export
//! - E-mail delivery of the latest estimate

mod app;
mod styles;
mod ui;

pub use app::{App, Screen, CSV_EXPORT_FILE, HTML_EXPORT_FILE};
pub use styles::InsuranceTheme;

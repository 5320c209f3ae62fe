//! # Premiumcast
#![allow(non_snake_case)]
//!
//! Health-insurance premium estimation in the terminal.
//!
//! This crate provides:
//! - Encoding of applicant details into the model feature vector
//! - Prediction through pre-trained random forest and linear models
//! - A per-session history ledger with CSV/HTML export and e-mail delivery
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (applicant, features, records, ledger)
//! - `ports`: Trait definitions for the estimator and mail transport
//! - `adapters`: Concrete implementations (JSON model artifacts, SMTP, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureVector, HistoryLedger, PredictionInput, PredictionRecord, Region};

/// Result type for Premiumcast operations
pub type Result<T> = std::result::Result<T, PremiumcastError>;

/// Main error type for Premiumcast
#[derive(Debug, thiserror::Error)]
pub enum PremiumcastError {
    #[error("Model error: {0}")]
    Model(#[from] adapters::ModelError),

    #[error("Mail error: {0}")]
    Mail(#[from] adapters::MailError),

    #[error("History error: {0}")]
    Ledger(#[from] domain::LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

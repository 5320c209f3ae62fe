//! Adapters layer: Concrete implementations of ports.
//!
//! - `estimator`: JSON model artifacts behind `CostEstimator`
//! - `mail`: SMTP delivery via lettre behind `EstimateMailer`
//! - `sanitize`: redaction of contact details and secrets in logs

pub mod estimator;
pub mod mail;
pub mod sanitize;

pub use estimator::{JsonEstimator, ModelError};
pub use mail::{MailError, SmtpMailer, SmtpSettings};

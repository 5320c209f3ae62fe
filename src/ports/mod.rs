//! Ports layer: Trait definitions for external operations.
//!
//! These traits are the seams between the application and the pre-trained
//! model artifacts and the mail transport.

mod estimator;
mod mailer;

pub use estimator::CostEstimator;
pub use mailer::{EstimateEmail, EstimateMailer};

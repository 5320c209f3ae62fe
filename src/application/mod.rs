//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod mail;
mod prediction;
mod session;

pub use mail::{compose, MailService};
pub use prediction::PredictionService;
pub use session::{Session, SessionSummary};

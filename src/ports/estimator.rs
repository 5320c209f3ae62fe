//! Estimator port: Trait for pre-trained premium models.
//!
//! The application only ever sees `predict(vector) -> scalar`; whether the
//! model behind it is a tree ensemble or a linear fit is an adapter detail.

use crate::domain::{FeatureVector, ModelVariant};

/// A loaded, read-only regression model.
pub trait CostEstimator: Send + Sync {
    /// Error type for prediction failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Which variant this estimator implements.
    fn variant(&self) -> ModelVariant;

    /// Predict the annual cost for one encoded input.
    ///
    /// # Errors
    /// Returns error if the model cannot produce a finite value.
    fn predict(&self, features: &FeatureVector) -> Result<f64, Self::Error>;
}

//! Prediction service: encode, estimate, record.
//!
//! One synchronous pass per form submission:
//! - Encode the input into the 8-feature vector
//! - Run the estimator selected by the session
//! - Build the history record in the session language
//! - Append it to the session ledger

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapters::{JsonEstimator, ModelError};
use crate::application::Session;
use crate::config::AppConfig;
use crate::domain::{FeatureVector, ModelVariant, PredictionInput, PredictionRecord};
use crate::ports::CostEstimator;
use crate::PremiumcastError;

/// Service for running premium predictions.
///
/// Estimators are loaded once and shared read-only.
pub struct PredictionService<E>
where
    E: CostEstimator,
{
    estimators: BTreeMap<ModelVariant, Arc<E>>,
}

impl PredictionService<JsonEstimator> {
    /// Load every model the configuration needs.
    ///
    /// # Errors
    /// Returns the first load failure; startup should not continue.
    pub fn load(config: &AppConfig) -> crate::Result<Self> {
        let mut estimators = Vec::new();
        for variant in config.required_models() {
            let estimator =
                JsonEstimator::load(&config.model_dir, variant, config.require_manifest)?;
            estimators.push(Arc::new(estimator));
        }
        Ok(Self::new(estimators))
    }
}

impl<E> PredictionService<E>
where
    E: CostEstimator,
    E::Error: Into<ModelError>,
{
    /// Create a service over already loaded estimators.
    ///
    /// A later estimator for the same variant replaces an earlier one.
    pub fn new(estimators: impl IntoIterator<Item = Arc<E>>) -> Self {
        let estimators = estimators
            .into_iter()
            .map(|e| (e.variant(), e))
            .collect();
        Self { estimators }
    }

    /// Variants that can be selected.
    #[must_use]
    pub fn available(&self) -> Vec<ModelVariant> {
        self.estimators.keys().copied().collect()
    }

    #[must_use]
    pub fn is_available(&self, variant: ModelVariant) -> bool {
        self.estimators.contains_key(&variant)
    }

    /// Estimate the annual cost for `input` and record it in `session`.
    ///
    /// # Errors
    /// Returns error if the session's model is not loaded or the estimator
    /// fails. The ledger is untouched on error.
    pub fn predict(
        &self,
        session: &mut Session,
        input: &PredictionInput,
    ) -> crate::Result<PredictionRecord> {
        let variant = session.model_variant();
        let estimator = self
            .estimators
            .get(&variant)
            .ok_or(ModelError::Unavailable(variant))?;

        let features = FeatureVector::encode(input);
        tracing::debug!("Encoded features: {:?}", features.as_slice());

        let cost = estimator
            .predict(&features)
            .map_err(|e| PremiumcastError::Model(e.into()))?;
        if !cost.is_finite() {
            return Err(ModelError::NonFinite(cost).into());
        }

        let record = PredictionRecord::new(input, session.language(), variant, cost);
        session.ledger_mut().append(record.clone());

        tracing::info!(
            "Prediction complete: model={}, cost={:.2}, history={}",
            variant,
            record.predicted_cost,
            session.ledger().len()
        );

        Ok(record)
    }
}

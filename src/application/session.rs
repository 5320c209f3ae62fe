//! Session context: per-user state created once at startup.
//!
//! Holds the UI language, the selected model and the prediction history.
//! History lives only as long as the session; `end` discards it.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::domain::{HistoryLedger, Language, ModelVariant};
use crate::PremiumcastError;

/// Mutable state of one interactive session.
#[derive(Debug)]
pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    language: Language,
    model_variant: ModelVariant,
    model_choice: bool,
    ledger: HistoryLedger,
}

/// What remains of a session after teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub predictions: usize,
}

impl Session {
    /// Start a session with the configured language and default model.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let session = Self {
            id: uuid_v4(),
            started_at: Utc::now(),
            language: config.language,
            model_variant: config.default_model,
            model_choice: config.model_choice,
            ledger: HistoryLedger::new(),
        };
        tracing::info!(
            "Session {} started (language={}, model={})",
            &session.id[..8],
            session.language.tag(),
            session.model_variant
        );
        session
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Switch between English and German.
    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    #[must_use]
    pub fn model_variant(&self) -> ModelVariant {
        self.model_variant
    }

    /// Whether the user may pick the model.
    #[must_use]
    pub fn model_choice(&self) -> bool {
        self.model_choice
    }

    /// Select the estimator for subsequent predictions.
    ///
    /// # Errors
    /// Returns `PremiumcastError::Validation` when the deployment runs a
    /// single fixed model and `variant` differs from it.
    pub fn set_model_variant(&mut self, variant: ModelVariant) -> crate::Result<()> {
        if !self.model_choice && variant != self.model_variant {
            return Err(PremiumcastError::Validation(format!(
                "Model is fixed to {}; cannot switch to {}",
                self.model_variant, variant
            )));
        }
        self.model_variant = variant;
        Ok(())
    }

    #[must_use]
    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut HistoryLedger {
        &mut self.ledger
    }

    /// Tear the session down, discarding its history.
    pub fn end(self) -> SessionSummary {
        let summary = SessionSummary {
            id: self.id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            predictions: self.ledger.len(),
        };
        tracing::info!(
            "Session {} ended after {} prediction(s)",
            &summary.id[..8],
            summary.predictions
        );
        summary
    }
}

/// Generate a random (v4) UUID string using a ChaCha20 CSPRNG.
fn uuid_v4() -> String {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

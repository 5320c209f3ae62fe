//! Mail service: sends the latest estimate to a user-supplied address.

use std::sync::Arc;

use crate::adapters::MailError;
use crate::application::Session;
use crate::domain::i18n::{estimate_message, t, Phrase};
use crate::domain::{Language, PredictionRecord};
use crate::ports::{EstimateEmail, EstimateMailer};
use crate::PremiumcastError;

/// Service for e-mailing estimates.
pub struct MailService<M>
where
    M: EstimateMailer,
{
    mailer: Arc<M>,
}

impl<M> MailService<M>
where
    M: EstimateMailer,
    M::Error: Into<MailError>,
{
    pub fn new(mailer: Arc<M>) -> Self {
        Self { mailer }
    }

    /// Send `record` to `to` in the session language.
    ///
    /// # Errors
    /// Returns error if the address is empty or delivery fails. The session
    /// is never modified.
    pub fn send_estimate(
        &self,
        session: &Session,
        to: &str,
        record: &PredictionRecord,
    ) -> crate::Result<()> {
        let to = to.trim();
        if to.is_empty() {
            return Err(PremiumcastError::Validation(
                t(session.language(), Phrase::RecipientMissing).to_string(),
            ));
        }

        let message = compose(session.language(), to, record);
        self.mailer
            .send(&message)
            .map_err(|e| PremiumcastError::Mail(e.into()))?;

        tracing::info!("Sent {} estimate to {}", record.model, to);
        Ok(())
    }

    /// Send the most recent estimate of the session.
    ///
    /// # Errors
    /// Returns `PremiumcastError::Validation` if nothing was predicted yet,
    /// otherwise as `send_estimate`.
    pub fn send_latest(&self, session: &Session, to: &str) -> crate::Result<()> {
        let record = session.ledger().last().ok_or_else(|| {
            PremiumcastError::Validation(
                t(session.language(), Phrase::NothingToSend).to_string(),
            )
        })?;
        self.send_estimate(session, to, record)
    }
}

/// Build the plaintext message for one estimate.
#[must_use]
pub fn compose(lang: Language, to: &str, record: &PredictionRecord) -> EstimateEmail {
    let mut body = estimate_message(lang, record.predicted_cost);
    body.push_str("\n\n");
    for (label, value) in [
        (t(lang, Phrase::Age), record.age.to_string()),
        (t(lang, Phrase::Sex), record.sex.clone()),
        (t(lang, Phrase::Bmi), format!("{:.2}", record.bmi)),
        (t(lang, Phrase::Children), record.children.to_string()),
        (t(lang, Phrase::Smoker), record.smoker.clone()),
        (t(lang, Phrase::Region), record.region.to_string()),
        (t(lang, Phrase::Model), record.model.to_string()),
    ] {
        body.push_str(&format!("{label}: {value}\n"));
    }
    body.push('\n');
    body.push_str(t(lang, Phrase::Disclaimer));

    EstimateEmail {
        to: to.to_string(),
        subject: t(lang, Phrase::EmailSubject).to_string(),
        body,
    }
}

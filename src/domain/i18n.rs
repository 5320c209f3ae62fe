//! Display strings for the two supported languages.

use serde::{Deserialize, Serialize};

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    English,
    Deutsch,
}

impl Language {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::English => Self::Deutsch,
            Self::Deutsch => Self::English,
        }
    }

    /// Short tag used in configuration (`en` / `de`).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Deutsch => "de",
        }
    }

    /// Parse a language tag or name.
    #[must_use]
    pub fn from_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Some(Self::English),
            "de" | "de-de" | "de-at" | "de-ch" | "deutsch" | "german" => Some(Self::Deutsch),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::English => write!(f, "English"),
            Self::Deutsch => write!(f, "Deutsch"),
        }
    }
}

/// Keys into the phrase table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Title,
    Welcome,
    Intro,
    Age,
    Sex,
    Bmi,
    Height,
    Weight,
    Children,
    Smoker,
    Region,
    Model,
    Predict,
    EstimatedCost,
    HistoryTitle,
    HistoryEmpty,
    DownloadCsv,
    PreviewHtml,
    SendEmail,
    EmailAddress,
    EmailSubject,
    EmailSent,
    EmailFailed,
    Saved,
    Disclaimer,
    FieldHint,
    AdjustHint,
    SwitchModel,
    Back,
    Quit,
    MailNotConfigured,
    RecipientMissing,
    NothingToSend,
}

/// Look up a phrase.
#[must_use]
pub fn t(lang: Language, phrase: Phrase) -> &'static str {
    use Language::{Deutsch as De, English as En};
    use Phrase as P;

    match (phrase, lang) {
        (P::Title, En) => "Insurance Cost Prediction",
        (P::Title, De) => "Versicherungskosten-Vorhersage",
        (P::Welcome, En) => "Welcome to the Insurance Cost Predictor!",
        (P::Welcome, De) => "Willkommen zur Versicherungskosten-Vorhersage!",
        (P::Intro, En) => {
            "Fill out the form to estimate your annual insurance cost using our trained model."
        }
        (P::Intro, De) => {
            "Füllen Sie das Formular aus, um Ihre jährlichen Versicherungskosten mithilfe unseres Modells zu schätzen."
        }
        (P::Age, En) => "Age",
        (P::Age, De) => "Alter",
        (P::Sex, En) => "Sex",
        (P::Sex, De) => "Geschlecht",
        (P::Bmi, _) => "BMI (Body Mass Index)",
        (P::Height, En) => "Height (cm)",
        (P::Height, De) => "Größe (cm)",
        (P::Weight, En) => "Weight (kg)",
        (P::Weight, De) => "Gewicht (kg)",
        (P::Children, En) => "Number of Children",
        (P::Children, De) => "Anzahl der Kinder",
        (P::Smoker, En) => "Smoker",
        (P::Smoker, De) => "Raucher",
        (P::Region, _) => "Region",
        (P::Model, En) => "Model",
        (P::Model, De) => "Modell",
        (P::Predict, En) => "Predict Insurance Cost",
        (P::Predict, De) => "Versicherungskosten vorhersagen",
        (P::EstimatedCost, En) => "Estimated Annual Insurance Cost",
        (P::EstimatedCost, De) => "Geschätzte jährliche Versicherungskosten",
        (P::HistoryTitle, En) => "Prediction History",
        (P::HistoryTitle, De) => "Vorhersagehistorie",
        (P::HistoryEmpty, En) => "No predictions yet.",
        (P::HistoryEmpty, De) => "Noch keine Vorhersagen.",
        (P::DownloadCsv, En) => "Download CSV",
        (P::DownloadCsv, De) => "CSV herunterladen",
        (P::PreviewHtml, En) => "Save HTML Report",
        (P::PreviewHtml, De) => "HTML-Bericht speichern",
        (P::SendEmail, En) => "Send by Email",
        (P::SendEmail, De) => "Per E-Mail senden",
        (P::EmailAddress, En) => "Email address",
        (P::EmailAddress, De) => "E-Mail-Adresse",
        (P::EmailSubject, En) => "Your insurance cost estimate",
        (P::EmailSubject, De) => "Ihre Versicherungskosten-Schätzung",
        (P::EmailSent, En) => "Email sent successfully.",
        (P::EmailSent, De) => "E-Mail erfolgreich gesendet.",
        (P::EmailFailed, En) => "Failed to send email",
        (P::EmailFailed, De) => "E-Mail konnte nicht gesendet werden",
        (P::Saved, En) => "Saved to",
        (P::Saved, De) => "Gespeichert unter",
        (P::FieldHint, En) => "Field",
        (P::FieldHint, De) => "Feld",
        (P::AdjustHint, En) => "Adjust",
        (P::AdjustHint, De) => "Ändern",
        (P::SwitchModel, En) => "Switch model",
        (P::SwitchModel, De) => "Modell wechseln",
        (P::Back, En) => "Back",
        (P::Back, De) => "Zurück",
        (P::Quit, En) => "Quit",
        (P::Quit, De) => "Beenden",
        (P::MailNotConfigured, En) => "mail transport not configured",
        (P::MailNotConfigured, De) => "E-Mail-Versand ist nicht eingerichtet",
        (P::RecipientMissing, En) => "Recipient address is empty",
        (P::RecipientMissing, De) => "Empfängeradresse fehlt",
        (P::NothingToSend, En) => "No estimate to send yet",
        (P::NothingToSend, De) => "Noch keine Schätzung zum Senden",
        (P::Disclaimer, En) => {
            "DISCLAIMER: Estimates are indicative only and are not an insurance offer."
        }
        (P::Disclaimer, De) => {
            "HINWEIS: Die Schätzungen sind unverbindlich und kein Versicherungsangebot."
        }
    }
}

/// Format an amount as `€1,234.56` (same in both languages).
///
/// The sign goes after the currency symbol (`€-42.10`), which is how the
/// estimate has always been displayed.
#[must_use]
pub fn format_euros(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("€{}{grouped}.{frac:02}", if negative { "-" } else { "" })
}

/// The localized result banner shown after a prediction.
#[must_use]
pub fn estimate_message(lang: Language, amount: f64) -> String {
    format!("{}: {}", t(lang, Phrase::EstimatedCost), format_euros(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_euros() {
        assert_eq!(format_euros(0.0), "€0.00");
        assert_eq!(format_euros(999.999), "€1,000.00");
        assert_eq!(format_euros(1234.5), "€1,234.50");
        assert_eq!(format_euros(1_234_567.891), "€1,234,567.89");
        assert_eq!(format_euros(-42.1), "€-42.10");
        assert_eq!(format_euros(-3392.456), "€-3,392.46");
    }

    #[test]
    fn test_estimate_message_is_localized() {
        assert_eq!(
            estimate_message(Language::English, 4248.5),
            "Estimated Annual Insurance Cost: €4,248.50"
        );
        assert!(estimate_message(Language::Deutsch, 10.0).starts_with("Geschätzte"));
    }

    #[test]
    fn test_key_hints_and_messages_are_translated() {
        for phrase in [
            Phrase::FieldHint,
            Phrase::AdjustHint,
            Phrase::SwitchModel,
            Phrase::Back,
            Phrase::Quit,
            Phrase::MailNotConfigured,
            Phrase::RecipientMissing,
            Phrase::NothingToSend,
        ] {
            assert_ne!(
                t(Language::English, phrase),
                t(Language::Deutsch, phrase),
                "{phrase:?}"
            );
        }
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_tag("DE"), Some(Language::Deutsch));
        assert_eq!(Language::from_tag("english"), Some(Language::English));
        assert_eq!(Language::from_tag("fr"), None);
        assert_eq!(Language::English.toggled(), Language::Deutsch);
    }
}

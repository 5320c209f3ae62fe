//! Prediction result types.
//!
//! A `PredictionRecord` is the immutable row appended to the session history
//! after each successful estimate.

use serde::{Deserialize, Serialize};

use super::applicant::{smoker, ParseError, PredictionInput, Region};
use super::i18n::Language;

/// Which pre-trained estimator produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ModelVariant {
    #[default]
    #[serde(rename = "Random Forest")]
    RandomForest,
    #[serde(rename = "Linear Regression")]
    LinearRegression,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::RandomForest, ModelVariant::LinearRegression];

    /// Default artifact file name inside the model directory.
    #[must_use]
    pub fn artifact_file(self) -> &'static str {
        match self {
            Self::RandomForest => "insurance_rf_model.json",
            Self::LinearRegression => "insurance_lr_model.json",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::LinearRegression => "Linear Regression",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::RandomForest => Self::LinearRegression,
            Self::LinearRegression => Self::RandomForest,
        }
    }

    /// Parse a label or config key (`random_forest`, `rf`, `Linear Regression`, ...).
    ///
    /// # Errors
    /// Returns `ParseError::UnknownModel` for anything else.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let norm: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match norm.as_str() {
            "randomforest" | "rf" => Ok(Self::RandomForest),
            "linearregression" | "linear" | "lr" => Ok(Self::LinearRegression),
            _ => Err(ParseError::UnknownModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to whole cents.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One row of prediction history.
///
/// Sex and smoker are stored in the display form of the language that was
/// active when the prediction was made. Field names double as CSV headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Age")]
    pub age: u8,

    #[serde(rename = "Sex")]
    pub sex: String,

    /// BMI exactly as encoded (derived values are unrounded)
    #[serde(rename = "BMI")]
    pub bmi: f64,

    #[serde(rename = "Children")]
    pub children: u8,

    #[serde(rename = "Smoker")]
    pub smoker: String,

    #[serde(rename = "Region")]
    pub region: Region,

    #[serde(rename = "Model")]
    pub model: ModelVariant,

    /// Estimated annual cost in EUR, rounded to 2 decimals
    #[serde(rename = "Predicted Cost (€)")]
    pub predicted_cost: f64,
}

/// Column headers in record order.
pub const RECORD_HEADERS: [&str; 8] = [
    "Age",
    "Sex",
    "BMI",
    "Children",
    "Smoker",
    "Region",
    "Model",
    "Predicted Cost (€)",
];

impl PredictionRecord {
    /// Snapshot an input and its prediction.
    #[must_use]
    pub fn new(
        input: &PredictionInput,
        lang: Language,
        model: ModelVariant,
        predicted_cost: f64,
    ) -> Self {
        Self {
            age: input.age,
            sex: input.sex.display(lang).to_string(),
            bmi: input.bmi.value(),
            children: input.children,
            smoker: smoker::display(input.smoker, lang).to_string(),
            region: input.region,
            model,
            predicted_cost: round_cents(predicted_cost),
        }
    }

    /// Cell values in header order, as shown in tables.
    #[must_use]
    pub fn display_cells(&self) -> [String; 8] {
        [
            self.age.to_string(),
            self.sex.clone(),
            format!("{:.2}", self.bmi),
            self.children.to_string(),
            self.smoker.clone(),
            self.region.to_string(),
            self.model.to_string(),
            format!("{:.2}", self.predicted_cost),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::applicant::{BmiInput, Sex};

    #[test]
    fn test_record_rounds_cost_and_uses_display_language() {
        let input = PredictionInput {
            age: 40,
            sex: Sex::Female,
            bmi: BmiInput::Direct(28.3),
            children: 2,
            smoker: false,
            region: Region::Southwest,
        };
        let record = PredictionRecord::new(&input, Language::Deutsch, ModelVariant::LinearRegression, 7345.6789);

        assert_eq!(record.sex, "weiblich");
        assert_eq!(record.smoker, "nein");
        assert!((record.predicted_cost - 7345.68).abs() < 1e-9);
        assert_eq!(record.display_cells()[6], "Linear Regression");
    }

    #[test]
    fn test_model_variant_parse() {
        assert_eq!(ModelVariant::parse("random_forest"), Ok(ModelVariant::RandomForest));
        assert_eq!(ModelVariant::parse("Linear Regression"), Ok(ModelVariant::LinearRegression));
        assert_eq!(ModelVariant::parse("LR"), Ok(ModelVariant::LinearRegression));
        assert!(ModelVariant::parse("xgboost").is_err());
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.005_f64 + 1e-9), 1.01);
        assert_eq!(round_cents(12.344), 12.34);
    }
}

//! Applicant attributes collected by the form.
//!
//! Mirrors the columns of the public insurance-charges dataset the models were
//! trained on: age, sex, BMI, children, smoker, region.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::i18n::Language;

/// Accepted age range (inclusive), matching the training data.
pub const AGE_RANGE: (u8, u8) = (18, 64);
/// Accepted direct BMI range (inclusive).
pub const BMI_RANGE: (f64, f64) = (15.0, 50.0);
/// Accepted height range in cm (inclusive), for derived BMI.
pub const HEIGHT_CM_RANGE: (f64, f64) = (50.0, 250.0);
/// Accepted weight range in kg (inclusive), for derived BMI.
pub const WEIGHT_KG_RANGE: (f64, f64) = (30.0, 200.0);
/// Accepted number of children (inclusive).
pub const CHILDREN_RANGE: (u8, u8) = (0, 5);

/// Error raised when parsing display text into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown sex value: {0:?}")]
    UnknownSex(String),

    #[error("Unknown smoker value: {0:?}")]
    UnknownSmoker(String),

    #[error("Unknown region: {0:?} (expected northeast, northwest, southeast or southwest)")]
    UnknownRegion(String),

    #[error("Unknown model variant: {0:?}")]
    UnknownModel(String),
}

/// Biological sex as recorded in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Model code: male = 0, female = 1.
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Male => 0.0,
            Self::Female => 1.0,
        }
    }

    /// Label shown in the given language.
    #[must_use]
    pub fn display(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Male, Language::English) => "male",
            (Self::Female, Language::English) => "female",
            (Self::Male, Language::Deutsch) => "männlich",
            (Self::Female, Language::Deutsch) => "weiblich",
        }
    }

    /// Parse a label in either language.
    ///
    /// # Errors
    /// Returns `ParseError::UnknownSex` for anything else.
    pub fn from_display(s: &str) -> Result<Self, ParseError> {
        match s.trim().to_lowercase().as_str() {
            "male" | "männlich" => Ok(Self::Male),
            "female" | "weiblich" => Ok(Self::Female),
            other => Err(ParseError::UnknownSex(other.to_string())),
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

/// Smoker status helpers (the field itself is a plain `bool`).
pub mod smoker {
    use super::{Language, ParseError};

    /// Model code: yes = 1, no = 0.
    #[must_use]
    pub fn code(smoker: bool) -> f64 {
        if smoker {
            1.0
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn display(smoker: bool, lang: Language) -> &'static str {
        match (smoker, lang) {
            (true, Language::English) => "yes",
            (false, Language::English) => "no",
            (true, Language::Deutsch) => "ja",
            (false, Language::Deutsch) => "nein",
        }
    }

    /// Parse `yes`/`no`/`ja`/`nein`.
    ///
    /// # Errors
    /// Returns `ParseError::UnknownSmoker` for anything else.
    pub fn from_display(s: &str) -> Result<bool, ParseError> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "ja" => Ok(true),
            "no" | "nein" => Ok(false),
            other => Err(ParseError::UnknownSmoker(other.to_string())),
        }
    }
}

/// US region. Northeast is the reference category of the one-hot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Northeast => "northeast",
            Self::Northwest => "northwest",
            Self::Southeast => "southeast",
            Self::Southwest => "southwest",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| ParseError::UnknownRegion(s.to_string()))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the BMI was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BmiInput {
    /// BMI entered directly.
    Direct(f64),
    /// BMI derived from height and weight.
    Derived { height_cm: f64, weight_kg: f64 },
}

impl BmiInput {
    /// The BMI value fed to the model. Derived values are not rounded.
    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Direct(bmi) => bmi,
            Self::Derived {
                height_cm,
                weight_kg,
            } => bmi_from_metrics(height_cm, weight_kg),
        }
    }
}

/// `weight / height_m²` with `height_m = height_cm / 100`.
#[must_use]
pub fn bmi_from_metrics(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// A fully populated form submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Age in years (18-64)
    pub age: u8,
    pub sex: Sex,
    pub bmi: BmiInput,
    /// Number of dependent children (0-5)
    pub children: u8,
    pub smoker: bool,
    pub region: Region,
}

impl PredictionInput {
    /// Check that every field lies in the range the form allows.
    ///
    /// The form clamps its widgets, so this only fails for inputs built
    /// outside of it. The encoder never calls this.
    ///
    /// # Errors
    /// Returns all validation errors found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        match self.bmi {
            BmiInput::Direct(bmi) => {
                if !(BMI_RANGE.0..=BMI_RANGE.1).contains(&bmi) {
                    errors.push(format!(
                        "BMI {bmi} out of range [{}, {}]",
                        BMI_RANGE.0, BMI_RANGE.1
                    ));
                }
            }
            BmiInput::Derived {
                height_cm,
                weight_kg,
            } => {
                if !(HEIGHT_CM_RANGE.0..=HEIGHT_CM_RANGE.1).contains(&height_cm) {
                    errors.push(format!(
                        "Height {height_cm} cm out of range [{}, {}]",
                        HEIGHT_CM_RANGE.0, HEIGHT_CM_RANGE.1
                    ));
                }
                if !(WEIGHT_KG_RANGE.0..=WEIGHT_KG_RANGE.1).contains(&weight_kg) {
                    errors.push(format!(
                        "Weight {weight_kg} kg out of range [{}, {}]",
                        WEIGHT_KG_RANGE.0, WEIGHT_KG_RANGE.1
                    ));
                }
            }
        }
        if !(CHILDREN_RANGE.0..=CHILDREN_RANGE.1).contains(&self.children) {
            errors.push(format!(
                "Children {} out of range [{}, {}]",
                self.children, CHILDREN_RANGE.0, CHILDREN_RANGE.1
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            age: 30,
            sex: Sex::Male,
            bmi: BmiInput::Direct(25.0),
            children: 0,
            smoker: true,
            region: Region::Northeast,
        }
    }
}

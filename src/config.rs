//! Runtime configuration read from the environment.
//!
//! One struct replaces the separate single-model / dual-model and
//! direct-BMI / derived-BMI variants of the form.

use std::path::PathBuf;

use crate::domain::{Language, ModelVariant};
use crate::PremiumcastError;

/// How the form collects BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BmiInputMode {
    /// A BMI slider.
    #[default]
    Direct,
    /// Height and weight fields; BMI is computed.
    Derived,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File on interactive terminals, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory containing the model artifacts
    pub model_dir: PathBuf,
    /// Model used when a session starts
    pub default_model: ModelVariant,
    /// Whether the user may switch between both models
    pub model_choice: bool,
    pub bmi_input_mode: BmiInputMode,
    /// Whether the e-mail screen is available
    pub email_enabled: bool,
    pub language: Language,
    /// Directory CSV/HTML exports are written to
    pub export_dir: PathBuf,
    /// Refuse model directories without a digest manifest
    pub require_manifest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            default_model: ModelVariant::RandomForest,
            model_choice: false,
            bmi_input_mode: BmiInputMode::Direct,
            email_enabled: false,
            language: Language::English,
            export_dir: PathBuf::from("."),
            require_manifest: false,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("premiumcast.log"),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" | "on" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "off" | "" => Ok(false),
        other => Err(PremiumcastError::Config(format!(
            "{name}: expected a boolean, got {other:?}"
        ))),
    }
}

impl AppConfig {
    /// Build configuration through `lookup` (normally `std::env::var`).
    ///
    /// Unset variables keep their defaults; set but malformed ones are errors.
    ///
    /// # Errors
    /// Returns `PremiumcastError::Config` naming the offending variable.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("PREMIUMCAST_MODEL_PATH") {
            cfg.model_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PREMIUMCAST_MODEL_VARIANT") {
            cfg.default_model = ModelVariant::parse(&v)
                .map_err(|e| PremiumcastError::Config(format!("PREMIUMCAST_MODEL_VARIANT: {e}")))?;
        }
        if let Some(v) = lookup("PREMIUMCAST_MODEL_CHOICE") {
            cfg.model_choice = parse_bool("PREMIUMCAST_MODEL_CHOICE", &v)?;
        }
        if let Some(v) = lookup("PREMIUMCAST_BMI_MODE") {
            cfg.bmi_input_mode = match v.trim().to_lowercase().as_str() {
                "direct" | "bmi" => BmiInputMode::Direct,
                "derived" | "height_weight" => BmiInputMode::Derived,
                other => {
                    return Err(PremiumcastError::Config(format!(
                        "PREMIUMCAST_BMI_MODE: expected direct or derived, got {other:?}"
                    )))
                }
            };
        }
        if let Some(v) = lookup("PREMIUMCAST_EMAIL_ENABLED") {
            cfg.email_enabled = parse_bool("PREMIUMCAST_EMAIL_ENABLED", &v)?;
        }
        if let Some(v) = lookup("PREMIUMCAST_LANGUAGE") {
            cfg.language = Language::from_tag(&v).ok_or_else(|| {
                PremiumcastError::Config(format!("PREMIUMCAST_LANGUAGE: unsupported {v:?}"))
            })?;
        }
        if let Some(v) = lookup("PREMIUMCAST_EXPORT_DIR") {
            cfg.export_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PREMIUMCAST_REQUIRE_MANIFEST") {
            cfg.require_manifest = parse_bool("PREMIUMCAST_REQUIRE_MANIFEST", &v)?;
        }
        if let Some(v) = lookup("PREMIUMCAST_LOG_MODE") {
            cfg.log_mode = match v.trim().to_lowercase().as_str() {
                "auto" | "" => LogMode::Auto,
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                other => {
                    return Err(PremiumcastError::Config(format!(
                        "PREMIUMCAST_LOG_MODE: expected auto, file or stdout, got {other:?}"
                    )))
                }
            };
        }
        if let Some(v) = lookup("PREMIUMCAST_LOG_FILE") {
            cfg.log_file = PathBuf::from(v);
        }

        Ok(cfg)
    }

    /// Build configuration from the process environment.
    ///
    /// # Errors
    /// Returns `PremiumcastError::Config` naming the offending variable.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Model variants that must be loaded at startup.
    #[must_use]
    pub fn required_models(&self) -> Vec<ModelVariant> {
        if self.model_choice {
            ModelVariant::ALL.to_vec()
        } else {
            vec![self.default_model]
        }
    }
}

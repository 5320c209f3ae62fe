//! Domain layer: Core business types and logic.
//!
//! Input types, the feature encoder, prediction records and the session
//! history ledger. Nothing here touches the terminal or the model files.

mod applicant;
mod features;
pub mod i18n;
mod ledger;
mod record;

pub use applicant::{
    bmi_from_metrics, smoker, BmiInput, ParseError, PredictionInput, Region, Sex, AGE_RANGE,
    BMI_RANGE, CHILDREN_RANGE, HEIGHT_CM_RANGE, WEIGHT_KG_RANGE,
};
pub use features::{FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use i18n::Language;
pub use ledger::{HistoryLedger, LedgerError};
pub use record::{round_cents, ModelVariant, PredictionRecord, RECORD_HEADERS};

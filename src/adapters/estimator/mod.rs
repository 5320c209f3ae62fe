//! JSON estimator adapter: Implementation of `CostEstimator`.
//!
//! Loads pre-trained models exported from the training notebook as JSON:
//!
//! - `insurance_rf_model.json`: random forest regressor (mean of trees)
//! - `insurance_lr_model.json`: ordinary least squares fit
//!
//! # Integrity
//!
//! If the model directory contains a `manifest.json`, every artifact loaded
//! must be listed in it with a matching SHA-256 digest. Set
//! `PREMIUMCAST_REQUIRE_MANIFEST=true` to refuse directories without one.
//! `cargo run --bin write_manifest -- <model_dir>` produces the manifest.
//!
//! # Tree layout
//!
//! Trees are flattened node arrays rooted at index 0. A split sends
//! `x[feature] <= threshold` to `left`, otherwise to `right`. Children must
//! have a higher index than their parent, which rules out cycles.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{FeatureVector, ModelVariant, FEATURE_NAMES, NUM_FEATURES};
use crate::ports::CostEstimator;

/// Name of the optional digest manifest inside the model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Error type for model loading and prediction.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model artifact: {0}")]
    Format(String),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),

    #[error("No model loaded for variant {0}")]
    Unavailable(ModelVariant),

    #[error("Model produced a non-finite prediction ({0})")]
    NonFinite(f64),
}

/// Digest manifest binding artifact files to their SHA-256.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

/// Model parameters as exported from training.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    RandomForest(ForestModel),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl Tree {
    fn validate(&self, index: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Format(format!("tree {index} has no nodes")));
        }
        let n = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= NUM_FEATURES {
                        return Err(ModelError::Format(format!(
                            "tree {index} node {i}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Format(format!(
                            "tree {index} node {i}: non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= n {
                            return Err(ModelError::Format(format!(
                                "tree {index} node {i}: child {child} must be in ({i}, {n})"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::Format(format!(
                            "tree {index} node {i}: non-finite leaf value"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::Format(format!("dangling node index {idx}")));
                }
            }
        }
    }
}

fn check_feature_layout(n_features: usize, names: &[String]) -> Result<(), ModelError> {
    if n_features != NUM_FEATURES {
        return Err(ModelError::Format(format!(
            "expected {NUM_FEATURES} features, model declares {n_features}"
        )));
    }
    if !names.is_empty() && names.iter().map(String::as_str).ne(FEATURE_NAMES) {
        return Err(ModelError::Format(format!(
            "feature order {names:?} does not match {FEATURE_NAMES:?}"
        )));
    }
    Ok(())
}

impl ModelArtifact {
    /// Sanity-check shapes before the model is used.
    ///
    /// # Errors
    /// Returns `ModelError::Format` describing the first problem found.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Linear(m) => {
                check_feature_layout(m.n_features, &m.feature_names)?;
                if m.coefficients.len() != NUM_FEATURES {
                    return Err(ModelError::Format(format!(
                        "expected {NUM_FEATURES} coefficients, got {}",
                        m.coefficients.len()
                    )));
                }
                if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::Format("non-finite linear parameter".into()));
                }
            }
            Self::RandomForest(m) => {
                check_feature_layout(m.n_features, &m.feature_names)?;
                if m.trees.is_empty() {
                    return Err(ModelError::Format("forest has no trees".into()));
                }
                for (i, tree) in m.trees.iter().enumerate() {
                    tree.validate(i)?;
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> Result<f64, ModelError> {
        match self {
            Self::Linear(m) => Ok(m
                .coefficients
                .iter()
                .zip(x)
                .map(|(w, v)| w * v)
                .sum::<f64>()
                + m.intercept),
            Self::RandomForest(m) => {
                let mut total = 0.0;
                for tree in &m.trees {
                    total += tree.evaluate(x)?;
                }
                Ok(total / m.trees.len() as f64)
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::RandomForest(_) => "random_forest",
        }
    }
}

/// Hex SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_manifest(model_dir: &Path) -> Result<Option<ModelManifest>, ModelError> {
    let path = model_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read(&path)?;
    let manifest: ModelManifest = serde_json::from_slice(&content)
        .map_err(|e| ModelError::Integrity(format!("invalid {MANIFEST_FILE}: {e}")))?;
    if manifest.version != 1 {
        return Err(ModelError::Integrity(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    Ok(Some(manifest))
}

fn verify_digest(
    model_dir: &Path,
    file_name: &str,
    bytes: &[u8],
    require_manifest: bool,
) -> Result<(), ModelError> {
    let Some(manifest) = read_manifest(model_dir)? else {
        if require_manifest {
            return Err(ModelError::Integrity(format!(
                "{MANIFEST_FILE} required but not found in {model_dir:?}"
            )));
        }
        tracing::warn!("No {MANIFEST_FILE} in {:?}; skipping digest check", model_dir);
        return Ok(());
    };

    let expected = manifest.files.get(file_name).ok_or_else(|| {
        ModelError::Integrity(format!("{file_name} is not listed in {MANIFEST_FILE}"))
    })?;
    let actual = sha256_hex(bytes);
    if !expected.eq_ignore_ascii_case(&actual) {
        return Err(ModelError::Integrity(format!(
            "digest mismatch for {file_name}"
        )));
    }
    Ok(())
}

/// Estimator backed by a JSON model artifact.
#[derive(Debug, Clone)]
pub struct JsonEstimator {
    variant: ModelVariant,
    artifact: ModelArtifact,
    digest: String,
}

impl JsonEstimator {
    /// Load the artifact for `variant` from `model_dir`.
    ///
    /// # Errors
    /// Returns error if the file is missing, fails the digest check, or is
    /// not a valid 8-feature model.
    pub fn load(
        model_dir: &Path,
        variant: ModelVariant,
        require_manifest: bool,
    ) -> Result<Self, ModelError> {
        let file_name = variant.artifact_file();
        let path = model_dir.join(file_name);
        if !path.is_file() {
            return Err(ModelError::NotFound(path));
        }

        let bytes = fs::read(&path)?;
        verify_digest(model_dir, file_name, &bytes, require_manifest)?;

        let estimator = Self::from_bytes(variant, &bytes)?;
        tracing::info!(
            "Loaded {} model from {:?} (kind={}, sha256={})",
            variant,
            path,
            estimator.artifact.kind(),
            &estimator.digest[..12]
        );
        Ok(estimator)
    }

    /// Parse and validate an artifact held in memory.
    ///
    /// # Errors
    /// Returns `ModelError::Format` if the JSON or its shapes are invalid.
    pub fn from_bytes(variant: ModelVariant, bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Format(e.to_string()))?;
        artifact.validate()?;
        let expected = match variant {
            ModelVariant::RandomForest => "random_forest",
            ModelVariant::LinearRegression => "linear",
        };
        if artifact.kind() != expected {
            return Err(ModelError::Format(format!(
                "{variant} expects a {expected} artifact, found {}",
                artifact.kind()
            )));
        }
        Ok(Self {
            variant,
            artifact,
            digest: sha256_hex(bytes),
        })
    }

    /// SHA-256 of the loaded artifact bytes.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl CostEstimator for JsonEstimator {
    type Error = ModelError;

    fn variant(&self) -> ModelVariant {
        self.variant
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let value = self.artifact.evaluate(features.as_slice())?;
        if !value.is_finite() {
            return Err(ModelError::NonFinite(value));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BmiInput, PredictionInput, Region, Sex};
    use tempfile::tempdir;

    fn example_vector() -> FeatureVector {
        FeatureVector::encode(&PredictionInput {
            age: 30,
            sex: Sex::Male,
            bmi: BmiInput::Direct(25.0),
            children: 0,
            smoker: false,
            region: Region::Northeast,
        })
    }

    fn linear_json(coefficients: &[f64], intercept: f64) -> Vec<u8> {
        serde_json::to_vec(&ModelArtifact::Linear(LinearModel {
            n_features: 8,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: coefficients.to_vec(),
            intercept,
        }))
        .expect("serialize")
    }

    #[test]
    fn test_linear_prediction_is_dot_product() {
        let bytes = linear_json(&[10.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0], 5.0);
        let est = JsonEstimator::from_bytes(ModelVariant::LinearRegression, &bytes)
            .expect("valid model");
        let value = est.predict(&example_vector()).expect("predict");
        assert!((value - (10.0 * 30.0 + 2.0 * 25.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_forest_prediction_is_mean_of_trees() {
        let json = r#"{
            "kind": "random_forest",
            "n_features": 8,
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 40.0, "left": 1, "right": 2},
                    {"value": 100.0},
                    {"value": 900.0}
                ]},
                {"nodes": [
                    {"feature": 4, "threshold": 0.5, "left": 1, "right": 2},
                    {"value": 300.0},
                    {"value": 5000.0}
                ]}
            ]
        }"#;
        let est = JsonEstimator::from_bytes(ModelVariant::RandomForest, json.as_bytes())
            .expect("valid forest");
        let value = est.predict(&example_vector()).expect("predict");
        assert!((value - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_artifact_of_other_kind() {
        let linear = linear_json(&[1.0; 8], 0.0);
        let err = JsonEstimator::from_bytes(ModelVariant::RandomForest, &linear)
            .expect_err("linear artifact is not a forest");
        assert!(matches!(err, ModelError::Format(_)));

        let forest = br#"{"kind":"random_forest","n_features":8,"trees":[{"nodes":[{"value":1.0}]}]}"#;
        assert!(JsonEstimator::from_bytes(ModelVariant::LinearRegression, forest).is_err());
        assert!(JsonEstimator::from_bytes(ModelVariant::RandomForest, forest).is_ok());
    }

    #[test]
    fn test_load_rejects_swapped_artifact_file() {
        let temp = tempdir().expect("tempdir");
        fs::write(
            temp.path().join(ModelVariant::RandomForest.artifact_file()),
            linear_json(&[1.0; 8], 0.0),
        )
        .expect("write model");
        assert!(matches!(
            JsonEstimator::load(temp.path(), ModelVariant::RandomForest, false),
            Err(ModelError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let json = br#"{"kind":"linear","n_features":9,"coefficients":[1,1,1,1,1,1,1,1,1],"intercept":0}"#;
        let err = JsonEstimator::from_bytes(ModelVariant::LinearRegression, json)
            .expect_err("must fail");
        assert!(err.to_string().contains("expected 8 features"));
    }

    #[test]
    fn test_rejects_backward_child_index() {
        let json = br#"{"kind":"random_forest","n_features":8,"trees":[{"nodes":[
            {"feature":0,"threshold":1.0,"left":1,"right":0},
            {"value":1.0}
        ]}]}"#;
        assert!(JsonEstimator::from_bytes(ModelVariant::RandomForest, json).is_err());
    }

    #[test]
    fn test_rejects_reordered_feature_names() {
        let mut names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        names.swap(0, 1);
        let bytes = serde_json::to_vec(&ModelArtifact::Linear(LinearModel {
            n_features: 8,
            feature_names: names,
            coefficients: vec![0.0; 8],
            intercept: 0.0,
        }))
        .expect("serialize");
        assert!(JsonEstimator::from_bytes(ModelVariant::LinearRegression, &bytes).is_err());
    }

    #[test]
    fn test_non_finite_prediction_is_error() {
        let bytes = linear_json(&[f64::MAX, 0.0, f64::MAX, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0);
        let est = JsonEstimator::from_bytes(ModelVariant::LinearRegression, &bytes)
            .expect("finite params");
        assert!(matches!(
            est.predict(&example_vector()),
            Err(ModelError::NonFinite(_))
        ));
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let temp = tempdir().expect("tempdir");
        let err = JsonEstimator::load(temp.path(), ModelVariant::RandomForest, false)
            .expect_err("must fail");
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_load_verifies_manifest_digest() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        let bytes = linear_json(&[1.0; 8], 0.0);
        fs::write(dir.join("insurance_lr_model.json"), &bytes).expect("write model");

        let mut files = BTreeMap::new();
        files.insert("insurance_lr_model.json".to_string(), sha256_hex(&bytes));
        let manifest = ModelManifest { version: 1, files };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("serialize"),
        )
        .expect("write manifest");

        JsonEstimator::load(dir, ModelVariant::LinearRegression, true).expect("digest matches");

        // Tamper with the artifact after the manifest was written.
        fs::write(dir.join("insurance_lr_model.json"), linear_json(&[2.0; 8], 0.0))
            .expect("overwrite");
        let err = JsonEstimator::load(dir, ModelVariant::LinearRegression, true)
            .expect_err("must fail");
        assert!(matches!(err, ModelError::Integrity(_)));
    }

    #[test]
    fn test_require_manifest_without_one_fails() {
        let temp = tempdir().expect("tempdir");
        fs::write(
            temp.path().join("insurance_lr_model.json"),
            linear_json(&[1.0; 8], 0.0),
        )
        .expect("write model");

        assert!(JsonEstimator::load(temp.path(), ModelVariant::LinearRegression, false).is_ok());
        assert!(matches!(
            JsonEstimator::load(temp.path(), ModelVariant::LinearRegression, true),
            Err(ModelError::Integrity(_))
        ));
    }

    #[test]
    fn test_bundled_models_load_and_predict() {
        for variant in ModelVariant::ALL {
            let est = JsonEstimator::load(Path::new("models"), variant, false)
                .expect("bundled model should load");
            let value = est.predict(&example_vector()).expect("predict");
            assert!(value.is_finite() && value >= 0.0);
        }
    }
}

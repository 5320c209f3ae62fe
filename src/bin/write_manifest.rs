//! Manifest utility for Premiumcast model artifacts.
//!
//! Writes `manifest.json` binding each model artifact to its SHA-256 so the
//! application can detect modified or swapped files at load time.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```
//!
//! Every artifact is parsed and validated before it is hashed; a directory
//! with an invalid model produces no manifest.

#![allow(non_snake_case)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use Premiumcast::adapters::estimator::{sha256_hex, ModelManifest, MANIFEST_FILE};
use Premiumcast::adapters::JsonEstimator;
use Premiumcast::domain::ModelVariant;

fn usage() -> String {
    "Usage: write_manifest <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf, String> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;

    for arg in args.by_ref() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_none() {
                    model_dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    model_dir.ok_or_else(usage)
}

fn main() -> Result<(), String> {
    let model_dir = parse_args()?;

    let model_dir = if model_dir.is_file() {
        model_dir
            .parent()
            .ok_or_else(|| "Model path has no parent directory".to_string())?
            .to_path_buf()
    } else {
        model_dir
    };

    let mut files: BTreeMap<String, String> = BTreeMap::new();

    for variant in ModelVariant::ALL {
        let rel = variant.artifact_file();
        let p = model_dir.join(rel);
        if !p.exists() {
            continue;
        }
        let bytes = fs::read(&p).map_err(|e| format!("Failed to read {p:?}: {e}"))?;
        JsonEstimator::from_bytes(variant, &bytes)
            .map_err(|e| format!("{rel} is not a valid {variant} artifact: {e}"))?;
        files.insert(rel.to_string(), sha256_hex(&bytes));
    }

    if files.is_empty() {
        return Err(format!(
            "No model JSON found in {model_dir:?} (expected {} or {})",
            ModelVariant::RandomForest.artifact_file(),
            ModelVariant::LinearRegression.artifact_file()
        ));
    }

    let manifest = ModelManifest { version: 1, files };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    println!("Wrote manifest: {manifest_path:?}");
    for (file, digest) in &manifest.files {
        println!("  {file}  sha256={digest}");
    }

    Ok(())
}

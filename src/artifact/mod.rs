//! On-disk artifact contract for trained models.
//!
//! A training run emits exactly three files into one directory:
//!
//! - `vectorizer.bin`: bincode [`VectorizerArtifact`]
//! - `model.bin`: bincode [`ModelArtifact`]
//! - `manifest.json`: human-readable [`ArtifactManifest`]
//!
//! The two binary artifacts each embed the run's `artifact_version`; the
//! manifest repeats it and carries SHA-256 checksums of both files. Loading
//! verifies all of that and refuses a directory where any piece disagrees,
//! so a vectorizer can never be paired with a model from a different run.

use crate::error::{AppError, Result};
use crate::ml::{EvaluationReport, ModelKind, ModelState, TfidfVectorizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bumped whenever the serialized layout changes incompatibly
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const MODEL_FILE: &str = "model.bin";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Fitted vectorizer plus the version of the run that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub artifact_version: String,
    pub vectorizer: TfidfVectorizer,
}

/// Fitted model plus the version of the run that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub artifact_version: String,
    pub model: ModelState,
}

/// SHA-256 hex digests of the two binary artifact files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactChecksums {
    pub vectorizer: String,
    pub model: String,
}

/// Sidecar describing an artifact pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema_version: u32,
    pub artifact_version: String,
    pub created_at: DateTime<Utc>,
    pub model: ModelKind,
    pub labels: Vec<String>,
    pub seed: u64,
    pub n_features: usize,
    pub vocab_size: usize,
    pub hyperparameters: HashMap<String, String>,
    pub evaluation: EvaluationReport,
    #[serde(default)]
    pub checksums: ArtifactChecksums,
}

/// A fully verified artifact pair as loaded from disk
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub manifest: ArtifactManifest,
    pub vectorizer: TfidfVectorizer,
    pub model: ModelState,
}

/// Write the artifact pair and its manifest into `dir`
///
/// Checksums are computed here from the exact bytes written, so the caller
/// passes the manifest with `checksums` left default. Returns the completed
/// manifest.
pub fn save_bundle(
    dir: &Path,
    vectorizer: &TfidfVectorizer,
    model: &ModelState,
    mut manifest: ArtifactManifest,
) -> Result<ArtifactManifest> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::Artifact(format!("cannot create {}: {e}", dir.display())))?;

    let vectorizer_artifact = VectorizerArtifact {
        artifact_version: manifest.artifact_version.clone(),
        vectorizer: vectorizer.clone(),
    };
    let model_artifact = ModelArtifact {
        artifact_version: manifest.artifact_version.clone(),
        model: model.clone(),
    };

    let vectorizer_bytes = bincode::serialize(&vectorizer_artifact)?;
    let model_bytes = bincode::serialize(&model_artifact)?;

    manifest.checksums = ArtifactChecksums {
        vectorizer: sha256_hex(&vectorizer_bytes),
        model: sha256_hex(&model_bytes),
    };

    write_bytes(&dir.join(VECTORIZER_FILE), &vectorizer_bytes)?;
    write_bytes(&dir.join(MODEL_FILE), &model_bytes)?;

    let manifest_path = dir.join(MANIFEST_FILE);
    let file = File::create(&manifest_path)
        .map_err(|e| AppError::Artifact(format!("cannot create {}: {e}", manifest_path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    writer.flush()?;

    tracing::info!(
        artifact_version = %manifest.artifact_version,
        dir = %dir.display(),
        "Saved artifact pair"
    );

    Ok(manifest)
}

/// Load and verify the artifact pair from `dir`
///
/// Any inconsistency is an error: unreadable or missing files, an unknown
/// schema version, checksum drift, or the two artifacts carrying different
/// versions.
pub fn load_bundle(dir: &Path) -> Result<ArtifactBundle> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let file = File::open(&manifest_path)
        .map_err(|e| AppError::Artifact(format!("cannot open {}: {e}", manifest_path.display())))?;
    let manifest: ArtifactManifest = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::Artifact(format!("malformed manifest {}: {e}", manifest_path.display())))?;

    if manifest.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(AppError::Artifact(format!(
            "unsupported artifact schema version {} (supported: {ARTIFACT_SCHEMA_VERSION})",
            manifest.schema_version
        )));
    }

    let vectorizer_bytes = read_bytes(&dir.join(VECTORIZER_FILE))?;
    let model_bytes = read_bytes(&dir.join(MODEL_FILE))?;

    verify_checksum(VECTORIZER_FILE, &vectorizer_bytes, &manifest.checksums.vectorizer)?;
    verify_checksum(MODEL_FILE, &model_bytes, &manifest.checksums.model)?;

    let vectorizer_artifact: VectorizerArtifact = bincode::deserialize(&vectorizer_bytes)
        .map_err(|e| AppError::Artifact(format!("cannot decode {VECTORIZER_FILE}: {e}")))?;
    let model_artifact: ModelArtifact = bincode::deserialize(&model_bytes)
        .map_err(|e| AppError::Artifact(format!("cannot decode {MODEL_FILE}: {e}")))?;

    verify_version(VECTORIZER_FILE, &manifest.artifact_version, &vectorizer_artifact.artifact_version)?;
    verify_version(MODEL_FILE, &manifest.artifact_version, &model_artifact.artifact_version)?;

    if model_artifact.model.as_classifier().kind() != manifest.model {
        return Err(AppError::Artifact(format!(
            "manifest declares model '{}' but {MODEL_FILE} holds '{}'",
            manifest.model,
            model_artifact.model.as_classifier().kind()
        )));
    }

    if vectorizer_artifact.vectorizer.n_features() != manifest.n_features {
        return Err(AppError::Artifact(format!(
            "manifest declares {} features but vectorizer has {}",
            manifest.n_features,
            vectorizer_artifact.vectorizer.n_features()
        )));
    }

    Ok(ArtifactBundle {
        manifest,
        vectorizer: vectorizer_artifact.vectorizer,
        model: model_artifact.model,
    })
}

/// SHA-256 digest as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)
        .map_err(|e| AppError::Artifact(format!("cannot write {}: {e}", path.display())))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| AppError::Artifact(format!("cannot read {}: {e}", path.display())))
}

fn verify_checksum(name: &str, bytes: &[u8], expected: &str) -> Result<()> {
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(AppError::Artifact(format!(
            "checksum mismatch for {name}: manifest has {expected}, file hashes to {actual}"
        )));
    }
    Ok(())
}

fn verify_version(component: &str, expected: &str, found: &str) -> Result<()> {
    if expected != found {
        return Err(AppError::ArtifactMismatch {
            component: component.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

// Model artifact persistence.
//
// A trained Pipeline is saved as a single self-contained JSON document:
// vocabulary, stop words, class set, and every log probability. Floats are
// written in shortest round-trip form and parsed back exactly, so a reloaded
// model predicts bit-identically to the one that was saved.
//
// Writes go to a temp file in the destination directory followed by a
// rename, so a crash mid-save never leaves a truncated model behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::model::pipeline::Pipeline;

/// Bumped whenever the serialized layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

/// Returns the default model artifact path.
/// Uses the platform data directory: ~/.local/share/tally/model.json on Linux.
pub fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("model.json")
}

/// A trained pipeline plus the metadata needed to reason about it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    /// Number of (description, category) rows the model was fitted on
    pub training_rows: usize,
    pub pipeline: Pipeline,
}

impl ModelArtifact {
    pub fn new(pipeline: Pipeline, training_rows: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            training_rows,
            pipeline,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize model artifact")
    }

    /// Parse and validate an artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_str(json).context("Model artifact is not valid JSON for this version")?;
        if artifact.format_version != FORMAT_VERSION {
            anyhow::bail!(
                "Model artifact has format version {}, expected {}. Retrain with `tally train`.",
                artifact.format_version,
                FORMAT_VERSION
            );
        }
        artifact
            .pipeline
            .validate()
            .context("Model artifact is internally inconsistent")?;
        Ok(artifact)
    }
}

/// Atomically write `artifact` to `path`, creating parent directories.
pub fn save(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let json = artifact.to_json()?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write model artifact")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to flush model artifact")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move model artifact into {}", path.display()))?;

    info!(
        path = %path.display(),
        bytes = json.len(),
        categories = artifact.pipeline.categories().len(),
        "Saved model artifact"
    );
    Ok(())
}

/// Read and validate the artifact at `path`.
pub fn load(path: &Path) -> Result<ModelArtifact> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model artifact at {}", path.display()))?;
    let artifact = ModelArtifact::from_json(&json)
        .with_context(|| format!("Failed to load model artifact at {}", path.display()))?;
    info!(
        path = %path.display(),
        trained_at = %artifact.trained_at,
        categories = artifact.pipeline.categories().len(),
        vocabulary = artifact.pipeline.vectorizer().dim(),
        "Loaded model artifact"
    );
    Ok(artifact)
}

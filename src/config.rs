use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::model::naive_bayes::NaiveBayesParams;
use crate::model::pipeline::PipelineParams;
use crate::text::vectorizer::VectorizerParams;

/// Default location of the training CSV, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "assets/expense_categorization_data.csv";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is valid.
#[derive(Debug, Clone)]
pub struct Config {
    /// Training data CSV (TALLY_DATA_PATH)
    pub data_path: PathBuf,
    /// Trained model artifact (TALLY_MODEL_PATH)
    pub model_path: PathBuf,
    /// Naive Bayes smoothing constant (TALLY_ALPHA)
    pub alpha: f64,
    /// Minimum document frequency, absolute (TALLY_MIN_DF)
    pub min_df: usize,
    /// Maximum document frequency, fraction of documents (TALLY_MAX_DF)
    pub max_df: f64,
    /// Vocabulary size cap (TALLY_MAX_FEATURES)
    pub max_features: usize,
    /// How many ranked categories the server returns (TALLY_TOP_K)
    pub top_k: usize,
    /// Largest batch accepted by POST /predict/batch (TALLY_MAX_BATCH)
    pub max_batch: usize,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vectorizer = VectorizerParams::default();
        let classifier = NaiveBayesParams::default();

        Ok(Self {
            data_path: lookup("TALLY_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            model_path: lookup("TALLY_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(crate::store::default_model_path),
            alpha: parse_or(&lookup, "TALLY_ALPHA", classifier.alpha)?,
            min_df: parse_or(&lookup, "TALLY_MIN_DF", vectorizer.min_df)?,
            max_df: parse_or(&lookup, "TALLY_MAX_DF", vectorizer.max_df)?,
            max_features: parse_or(&lookup, "TALLY_MAX_FEATURES", vectorizer.max_features)?,
            top_k: parse_or(&lookup, "TALLY_TOP_K", 5)?,
            max_batch: parse_or(&lookup, "TALLY_MAX_BATCH", 500)?,
        })
    }

    /// Training hyperparameters for both pipeline stages.
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams {
            vectorizer: VectorizerParams {
                min_df: self.min_df,
                max_df: self.max_df,
                max_features: self.max_features,
                ..VectorizerParams::default()
            },
            classifier: NaiveBayesParams { alpha: self.alpha },
        }
    }

    /// Check that a trained model exists where we expect it.
    /// Call this before any operation that serves predictions from disk.
    pub fn require_model(&self) -> Result<()> {
        if !self.model_path.exists() {
            anyhow::bail!(
                "No trained model at {}\n\
                 Run `tally train` first, or point TALLY_MODEL_PATH at an existing model.",
                self.model_path.display()
            );
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

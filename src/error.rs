// Error taxonomy for the classification engine.
//
// Training failures abort the whole fit and never produce a partial model.
// Inference failures are per call (or per item in a batch) and are never
// fatal to the process.

use thiserror::Error;

/// Everything the vectorizer, classifier, and pipeline can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The training corpus produced no usable features after cleaning and pruning.
    #[error("training corpus of {documents} documents produced an empty vocabulary")]
    EmptyVocabulary { documents: usize },

    /// Labels are missing, blank, or do not line up with the training texts.
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Inference was asked to classify empty or whitespace-only text.
    #[error("description cannot be empty")]
    EmptyInput,

    /// No trained model has been loaded yet.
    #[error("model not loaded")]
    ModelNotReady,

    /// A count vector or parameter table has the wrong width.
    #[error("dimension mismatch: expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A training hyperparameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ModelError {
    /// Whether the same call can succeed later without the caller changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::ModelNotReady)
    }
}

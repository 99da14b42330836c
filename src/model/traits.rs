// Categorizer trait — the seam between the serving layer and the model.
//
// The serving side only ever talks to `dyn Categorizer`, so a trained
// Pipeline, a reloaded one, or a test double can be swapped in without
// touching the handlers.

use super::prediction::Prediction;
use crate::error::ModelError;

/// Anything that can assign expense descriptions to categories.
pub trait Categorizer: Send + Sync {
    /// Classify a single description.
    fn predict_one(&self, text: &str) -> Result<Prediction, ModelError>;

    /// Classify each description independently, index-aligned with `texts`.
    /// One item's failure never affects another's result.
    fn predict_many(&self, texts: &[String]) -> Vec<Result<Prediction, ModelError>> {
        texts.iter().map(|text| self.predict_one(text)).collect()
    }

    /// Every category this model can predict, in canonical order.
    fn categories(&self) -> &[String];
}

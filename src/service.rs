// ModelHandle — the serving side's owned, swappable reference to the
// currently loaded model.
//
// The lock only guards the pointer. Readers clone the inner Arc and run
// inference without holding the lock, so a swap never waits on in-flight
// predictions and a prediction never observes a half-replaced model.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::ModelError;
use crate::model::prediction::Prediction;
use crate::model::traits::Categorizer;

/// Shared handle to the loaded categorizer, if any. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct ModelHandle {
    current: Arc<RwLock<Option<Arc<dyn Categorizer>>>>,
}

impl ModelHandle {
    /// A handle with nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn Categorizer>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(model))),
        }
    }

    /// Whether a trained model is loaded.
    pub async fn is_ready(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// The loaded model, or `ModelNotReady`.
    pub async fn current(&self) -> Result<Arc<dyn Categorizer>, ModelError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(ModelError::ModelNotReady)
    }

    /// Install `model`, returning whatever was loaded before.
    pub async fn swap(&self, model: Arc<dyn Categorizer>) -> Option<Arc<dyn Categorizer>> {
        let categories = model.categories().len();
        let previous = self.current.write().await.replace(model);
        info!(
            categories,
            replaced = previous.is_some(),
            "Installed categorization model"
        );
        previous
    }

    pub async fn predict_one(&self, text: &str) -> Result<Prediction, ModelError> {
        self.current().await?.predict_one(text)
    }

    /// Per-item results, index-aligned with `texts`. Fails as a whole only
    /// when no model is loaded.
    pub async fn predict_many(
        &self,
        texts: &[String],
    ) -> Result<Vec<Result<Prediction, ModelError>>, ModelError> {
        Ok(self.current().await?.predict_many(texts))
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, ModelError> {
        Ok(self.current().await?.categories().to_vec())
    }
}

// Prediction results handed to callers of the pipeline.

use serde::{Deserialize, Serialize};

/// One category with its posterior probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCategory {
    pub category: String,
    pub probability: f64,
}

/// The outcome of classifying a single description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The most likely category
    pub category: String,
    /// Probability of `category`, i.e. the max of the distribution
    pub confidence: f64,
    /// Every known category, most likely first; probabilities sum to 1
    pub ranked: Vec<RankedCategory>,
}

impl Prediction {
    /// Build from a ranking that is already sorted most likely first.
    ///
    /// Returns None for an empty ranking.
    pub fn from_ranked(ranked: Vec<RankedCategory>) -> Option<Self> {
        let head = ranked.first()?;
        Some(Self {
            category: head.category.clone(),
            confidence: head.probability,
            ranked,
        })
    }

    /// The `k` most likely categories.
    pub fn top(&self, k: usize) -> &[RankedCategory] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    /// Probability assigned to `category`, or None if it is not a known class.
    pub fn probability_of(&self, category: &str) -> Option<f64> {
        self.ranked
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.probability)
    }
}

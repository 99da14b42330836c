// Multinomial Naive Bayes over count vectors.
//
// Training estimates a log prior per class and a smoothed log likelihood
// per (class, feature). Scoring is a sparse dot product of the count vector
// with each class's log likelihood row, plus the prior:
//
//   log_score[c] = class_log_prior[c] + sum_i count[i] * feature_log_prob[c][i]
//
// Probabilities come from a log-sum-exp normalization of those scores.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::classes::{ClassId, ClassSet};
use crate::error::ModelError;
use crate::text::vocabulary::CountVector;

/// Hyperparameters for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParams {
    /// Additive (Lidstone) smoothing constant
    pub alpha: f64,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self { alpha: 0.1 }
    }
}

impl NaiveBayesParams {
    /// Fit class priors and per-class feature distributions.
    pub fn fit<L: AsRef<str>>(
        &self,
        vectors: &[CountVector],
        labels: &[L],
    ) -> Result<MultinomialNb, ModelError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        if vectors.len() != labels.len() {
            return Err(ModelError::InsufficientData(format!(
                "{} vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        if vectors.is_empty() {
            return Err(ModelError::InsufficientData("no training rows".to_string()));
        }

        let (classes, ids) = ClassSet::from_labels(labels)?;

        let n_features = vectors[0].dim();
        if n_features == 0 {
            return Err(ModelError::EmptyVocabulary {
                documents: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.dim() != n_features) {
            return Err(ModelError::DimensionMismatch {
                expected: n_features,
                found: bad.dim(),
            });
        }

        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0f64; n_features]; classes.len()];
        for (vector, id) in vectors.iter().zip(&ids) {
            class_count[id.index()] += 1;
            let row = &mut feature_count[id.index()];
            for (i, count) in vector.iter() {
                row[i] += count as f64;
            }
        }

        let n_rows = vectors.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&c| (c as f64 / n_rows).ln())
            .collect();

        let feature_log_prob = feature_count
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum::<f64>() + self.alpha * n_features as f64;
                let log_total = total.ln();
                row.iter()
                    .map(|&count| (count + self.alpha).ln() - log_total)
                    .collect()
            })
            .collect();

        Ok(MultinomialNb {
            alpha: self.alpha,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }
}

/// A trained multinomial Naive Bayes classifier. Immutable once fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    classes: ClassSet,
    class_log_prior: Vec<f64>,
    /// [n_classes][n_features]
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    pub fn class_log_prior(&self) -> &[f64] {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &[Vec<f64>] {
        &self.feature_log_prob
    }

    /// Check that the parameter tables agree with each other and with a
    /// vocabulary of `n_features` terms. Used after deserialization.
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n_classes = self.classes.len();
        if self.class_log_prior.len() != n_classes {
            return Err(ModelError::DimensionMismatch {
                expected: n_classes,
                found: self.class_log_prior.len(),
            });
        }
        if self.feature_log_prob.len() != n_classes {
            return Err(ModelError::DimensionMismatch {
                expected: n_classes,
                found: self.feature_log_prob.len(),
            });
        }
        if let Some(row) = self.feature_log_prob.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::DimensionMismatch {
                expected: n_features,
                found: row.len(),
            });
        }
        let all_finite = self.class_log_prior.iter().all(|p| p.is_finite())
            && self.feature_log_prob.iter().flatten().all(|p| p.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidParameter(
                "non-finite log probability".to_string(),
            ));
        }
        Ok(())
    }

    /// Unnormalized log score per class, indexed by ClassId.
    pub fn log_scores(&self, vector: &CountVector) -> Result<Vec<f64>, ModelError> {
        if vector.dim() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                found: vector.dim(),
            });
        }
        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                prior
                    + vector
                        .iter()
                        .map(|(i, count)| count as f64 * row[i])
                        .sum::<f64>()
            })
            .collect())
    }

    /// Posterior distribution over classes, indexed by ClassId.
    pub fn predict_proba(&self, vector: &CountVector) -> Result<Vec<f64>, ModelError> {
        Ok(normalize_log_scores(&self.log_scores(vector)?))
    }

    /// Classes with their probabilities, most likely first.
    pub fn rank(&self, vector: &CountVector) -> Result<Vec<(ClassId, f64)>, ModelError> {
        let scores = self.log_scores(vector)?;
        let probs = normalize_log_scores(&scores);
        Ok(rank_classes(&scores, &probs)
            .into_iter()
            .map(|i| (ClassId::new(i), probs[i]))
            .collect())
    }

    /// The most likely class.
    pub fn predict(&self, vector: &CountVector) -> Result<ClassId, ModelError> {
        let ranked = self.rank(vector)?;
        Ok(ranked[0].0)
    }
}

/// Turn log scores into probabilities, subtracting the max before
/// exponentiating so large magnitudes neither overflow nor underflow to 0/0.
pub fn normalize_log_scores(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Class indices ordered by probability, then log score, then class order.
///
/// Ties in probability after rounding still resolve to the higher log
/// score, so the head of this ranking is both the argmax of the scores and
/// the argmax of the probabilities.
pub fn rank_classes(scores: &[f64], probs: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(Ordering::Equal)
            .then(scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal))
            .then(a.cmp(&b))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec(dim: usize, entries: &[(usize, u32)]) -> CountVector {
        CountVector::from_counts(dim, entries.iter().copied()).unwrap()
    }

    fn trained() -> MultinomialNb {
        // feature 0 = "coffee", 1 = "bus", 2 = "grocery"
        let vectors = vec![vec(3, &[(0, 2)]), vec(3, &[(1, 1)]), vec(3, &[(2, 1)])];
        NaiveBayesParams::default()
            .fit(&vectors, &["food", "transport", "food"])
            .unwrap()
    }

    #[test]
    fn priors_and_likelihoods_are_distributions() {
        let nb = trained();
        let prior_sum: f64 = nb.class_log_prior().iter().map(|p| p.exp()).sum();
        assert!((prior_sum - 1.0).abs() < 1e-12);
        for row in nb.feature_log_prob() {
            let s: f64 = row.iter().map(|p| p.exp()).sum();
            assert!((s - 1.0).abs() < 1e-12, "row sums to {s}");
        }
    }

    #[test]
    fn smoothed_estimates_match_formula() {
        let nb = trained();
        // food: counts [2, 0, 1], total 3 + 0.1 * 3 = 3.3
        let food = nb.classes().id("food").unwrap().index();
        let expected = (2.1f64 / 3.3).ln();
        assert!((nb.feature_log_prob()[food][0] - expected).abs() < 1e-12);
        assert!((nb.class_log_prior()[food] - (2.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn predict_follows_evidence() {
        let nb = trained();
        let id = nb.predict(&vec(3, &[(1, 3)])).unwrap();
        assert_eq!(nb.classes().label(id), "transport");
    }

    #[test]
    fn zero_vector_falls_back_to_priors() {
        let nb = trained();
        let scores = nb.log_scores(&CountVector::zeros(3)).unwrap();
        assert_eq!(scores, nb.class_log_prior());
        let id = nb.predict(&CountVector::zeros(3)).unwrap();
        assert_eq!(nb.classes().label(id), "food");
    }

    #[test]
    fn rank_is_sorted_and_sums_to_one() {
        let nb = trained();
        let ranked = nb.rank(&vec(3, &[(0, 1), (1, 1)])).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].1 >= ranked[1].1);
        let sum: f64 = ranked.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let nb = trained();
        assert_eq!(
            nb.log_scores(&CountVector::zeros(5)).unwrap_err(),
            ModelError::DimensionMismatch {
                expected: 3,
                found: 5
            }
        );
    }

    #[test]
    fn mismatched_lengths_and_empty_input_fail() {
        let p = NaiveBayesParams::default();
        let one = vec![vec(2, &[(0, 1)])];
        assert!(matches!(
            p.fit(&one, &["a", "b"]),
            Err(ModelError::InsufficientData(_))
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            p.fit(&[], &none),
            Err(ModelError::InsufficientData(_))
        ));
    }

    #[test]
    fn non_positive_alpha_is_rejected() {
        let p = NaiveBayesParams { alpha: 0.0 };
        let one = vec![vec(2, &[(0, 1)])];
        assert!(matches!(
            p.fit(&one, &["a"]),
            Err(ModelError::InvalidParameter(_))
        ));
    }

    #[test]
    fn normalize_handles_extreme_scores() {
        let probs = normalize_log_scores(&[-10_000.0, -10_001.0, -20_000.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn rank_ties_resolve_in_class_order() {
        assert_eq!(rank_classes(&[-1.0, -1.0, -0.5], &[0.25, 0.25, 0.5]), vec![2, 0, 1]);
    }

    #[test]
    fn validate_catches_inconsistent_tables() {
        let nb = trained();
        assert!(nb.validate(3).is_ok());
        assert!(matches!(
            nb.validate(4),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }
}

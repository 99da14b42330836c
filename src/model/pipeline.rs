// Pipeline — vectorizer and classifier trained and applied as one unit.
//
// Fitting is all-or-nothing: the vectorizer fixes the vocabulary, the
// classifier is trained on the resulting vectors, and only when both
// succeed is a Pipeline returned. A fitted Pipeline is immutable, so any
// number of threads can predict against it without locking.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::naive_bayes::{MultinomialNb, NaiveBayesParams};
use super::prediction::{Prediction, RankedCategory};
use super::traits::Categorizer;
use crate::error::ModelError;
use crate::text::vectorizer::{Vectorizer, VectorizerParams};

/// Hyperparameters for both stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub vectorizer: VectorizerParams,
    pub classifier: NaiveBayesParams,
}

/// A trained vectorizer + classifier pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    vectorizer: Vectorizer,
    classifier: MultinomialNb,
}

impl Pipeline {
    /// Train on parallel slices of descriptions and category labels.
    pub fn fit<S, L>(params: &PipelineParams, texts: &[S], labels: &[L]) -> Result<Self, ModelError>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        if texts.len() != labels.len() {
            return Err(ModelError::InsufficientData(format!(
                "{} descriptions but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let (vectorizer, vectors) = params.vectorizer.fit_transform(texts)?;
        info!(
            documents = texts.len(),
            vocabulary = vectorizer.dim(),
            "Fitted vectorizer"
        );

        let classifier = params.classifier.fit(&vectors, labels)?;
        info!(
            classes = classifier.classes().len(),
            alpha = classifier.alpha(),
            "Fitted classifier"
        );

        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Train on `(description, category)` pairs.
    pub fn fit_pairs(
        params: &PipelineParams,
        pairs: &[(String, String)],
    ) -> Result<Self, ModelError> {
        let (texts, labels): (Vec<&str>, Vec<&str>) = pairs
            .iter()
            .map(|(text, label)| (text.as_str(), label.as_str()))
            .unzip();
        Self::fit(params, &texts, &labels)
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    /// Known categories in canonical (first-seen training) order.
    pub fn categories(&self) -> &[String] {
        self.classifier.classes().labels()
    }

    /// Check internal consistency, e.g. after loading from storage.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.classifier.validate(self.vectorizer.dim())
    }

    /// The most likely category for `text`.
    pub fn predict(&self, text: &str) -> Result<&str, ModelError> {
        let vector = self.vectorizer.transform(require_text(text)?);
        let id = self.classifier.predict(&vector)?;
        Ok(self.classifier.classes().label(id))
    }

    /// Posterior probabilities, index-aligned with `categories()`.
    pub fn predict_proba(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        let vector = self.vectorizer.transform(require_text(text)?);
        self.classifier.predict_proba(&vector)
    }

    /// Category, confidence, and the full ranked distribution for `text`.
    pub fn predict_one(&self, text: &str) -> Result<Prediction, ModelError> {
        let vector = self.vectorizer.transform(require_text(text)?);
        let classes = self.classifier.classes();
        let ranked = self
            .classifier
            .rank(&vector)?
            .into_iter()
            .map(|(id, probability)| RankedCategory {
                category: classes.label(id).to_string(),
                probability,
            })
            .collect();
        Prediction::from_ranked(ranked)
            .ok_or_else(|| ModelError::InsufficientData("model has no categories".to_string()))
    }

    /// `predict_one` for every item, in parallel, index-aligned with `texts`.
    pub fn predict_many<S>(&self, texts: &[S]) -> Vec<Result<Prediction, ModelError>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.predict_one(text.as_ref()))
            .collect()
    }
}

impl Categorizer for Pipeline {
    fn predict_one(&self, text: &str) -> Result<Prediction, ModelError> {
        Pipeline::predict_one(self, text)
    }

    fn predict_many(&self, texts: &[String]) -> Vec<Result<Prediction, ModelError>> {
        Pipeline::predict_many(self, texts)
    }

    fn categories(&self) -> &[String] {
        Pipeline::categories(self)
    }
}

fn require_text(text: &str) -> Result<&str, ModelError> {
    if text.trim().is_empty() {
        return Err(ModelError::EmptyInput);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pipeline {
        Pipeline::fit(
            &PipelineParams::default(),
            &["coffee at starbucks", "bus ticket", "grocery shopping"],
            &["food", "transport", "food"],
        )
        .unwrap()
    }

    #[test]
    fn unseen_words_fall_back_to_priors() {
        let p = sample();
        let prediction = p.predict_one("latte at cafe").unwrap();
        assert_eq!(prediction.category, "food");
        assert_eq!(prediction.ranked.len(), 2);
        let sum: f64 = prediction.ranked.iter().map(|r| r.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn evidence_beats_priors() {
        let p = sample();
        assert_eq!(p.predict("BUS ticket please").unwrap(), "transport");
    }

    #[test]
    fn empty_training_set_fails_cleanly() {
        let none: [&str; 0] = [];
        let err = Pipeline::fit(&PipelineParams::default(), &none, &none).unwrap_err();
        assert!(matches!(
            err,
            ModelError::EmptyVocabulary { .. } | ModelError::InsufficientData(_)
        ));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = Pipeline::fit(&PipelineParams::default(), &["a b"], &["x", "y"]).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData(_)));
    }

    #[test]
    fn blank_text_is_empty_input() {
        let p = sample();
        assert_eq!(p.predict_one("   ").unwrap_err(), ModelError::EmptyInput);
        assert_eq!(p.predict("").unwrap_err(), ModelError::EmptyInput);
    }

    #[test]
    fn batch_isolates_failures() {
        let p = sample();
        let results = p.predict_many(&["bus ticket", "", "coffee"]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().category, "transport");
        assert_eq!(results[1], Err(ModelError::EmptyInput));
        assert!(results[2].is_ok());
    }

    #[test]
    fn proba_aligns_with_categories() {
        let p = sample();
        let probs = p.predict_proba("bus").unwrap();
        assert_eq!(probs.len(), p.categories().len());
        let transport = p.categories().iter().position(|c| c == "transport").unwrap();
        let best = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(best, transport);
    }

    #[test]
    fn fitted_pipeline_validates() {
        assert!(sample().validate().is_ok());
    }
}

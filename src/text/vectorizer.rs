// Bag-of-n-grams count vectorizer.
//
// Fitting learns a vocabulary of unigrams and bigrams from the training
// corpus, pruned by document frequency and capped in size. The fitted
// Vectorizer is frozen: transform never adds features, it only counts
// the ones it already knows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tokenize::{features, StopWords};
use super::vocabulary::{distinct, CountVector, Vocabulary};
use crate::error::ModelError;

/// Hyperparameters for building a vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Features seen in fewer documents than this are dropped (absolute count)
    pub min_df: usize,
    /// Features seen in more than this fraction of documents are dropped
    pub max_df: f64,
    /// Upper bound on vocabulary size; the most widespread features win
    pub max_features: usize,
    pub stop_words: StopWords,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_df: 0.95,
            max_features: 1000,
            stop_words: StopWords::english(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DocFrequency {
    documents: usize,
    first_seen: usize,
}

impl VectorizerParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.min_df == 0 {
            return Err(ModelError::InvalidParameter(
                "min_df must be at least 1".to_string(),
            ));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == 0 {
            return Err(ModelError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Learn a vocabulary from `corpus`.
    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Result<Vectorizer, ModelError> {
        self.fit_transform(corpus).map(|(vectorizer, _)| vectorizer)
    }

    /// Learn a vocabulary and return the count vectors of the training
    /// documents under it, extracting each document's features only once.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        corpus: &[S],
    ) -> Result<(Vectorizer, Vec<CountVector>), ModelError> {
        self.validate()?;

        let documents: Vec<Vec<String>> = corpus
            .iter()
            .map(|doc| features(doc.as_ref(), &self.stop_words))
            .collect();
        let n_docs = documents.len();
        if n_docs == 0 {
            return Err(ModelError::EmptyVocabulary { documents: 0 });
        }

        let mut frequencies: HashMap<&str, DocFrequency> = HashMap::new();
        for doc in &documents {
            for feature in distinct(doc) {
                let next = frequencies.len();
                frequencies
                    .entry(feature)
                    .or_insert(DocFrequency {
                        documents: 0,
                        first_seen: next,
                    })
                    .documents += 1;
            }
        }

        let observed = frequencies.len();
        let max_doc_count = self.max_df * n_docs as f64;
        let mut kept: Vec<(&str, DocFrequency)> = frequencies
            .into_iter()
            .filter(|(_, df)| df.documents >= self.min_df && df.documents as f64 <= max_doc_count)
            .collect();
        let pruned = observed - kept.len();

        if kept.len() > self.max_features {
            kept.sort_by(|a, b| {
                b.1.documents
                    .cmp(&a.1.documents)
                    .then(a.1.first_seen.cmp(&b.1.first_seen))
            });
            kept.truncate(self.max_features);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term.to_string()).collect();
        terms.sort();

        if terms.is_empty() {
            return Err(ModelError::EmptyVocabulary { documents: n_docs });
        }

        let vocabulary = Vocabulary::try_from(terms)?;
        debug!(
            documents = n_docs,
            observed,
            pruned,
            vocabulary = vocabulary.len(),
            "Built vocabulary"
        );

        let vectors = documents
            .iter()
            .map(|doc| count_features(&vocabulary, doc))
            .collect();

        Ok((
            Vectorizer {
                stop_words: self.stop_words.clone(),
                vocabulary,
            },
            vectors,
        ))
    }
}

/// A fitted, frozen vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vectorizer {
    stop_words: StopWords,
    vocabulary: Vocabulary,
}

impl Vectorizer {
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Width of every vector this vectorizer produces.
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    /// Count the known features of `text`. Unknown features are dropped, so
    /// unseen text yields the all-zero vector rather than an error.
    pub fn transform(&self, text: &str) -> CountVector {
        count_features(&self.vocabulary, &features(text, &self.stop_words))
    }

    pub fn transform_many<S: AsRef<str>>(&self, texts: &[S]) -> Vec<CountVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }
}

fn count_features(vocabulary: &Vocabulary, features: &[String]) -> CountVector {
    let mut vector = CountVector::zeros(vocabulary.len());
    for feature in features {
        if let Some(index) = vocabulary.index_of(feature) {
            vector.increment(index);
        }
    }
    vector
}

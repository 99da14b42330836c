// Vocabulary and CountVector — the value types shared by the vectorizer
// and the classifier.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Bijective mapping between features and contiguous indices `0..len`.
///
/// Built once by the vectorizer and immutable afterward. Serialized as the
/// index-ordered term list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = ModelError;

    fn try_from(terms: Vec<String>) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                return Err(ModelError::InvalidParameter(format!(
                    "duplicate vocabulary term {term:?}"
                )));
            }
        }
        Ok(Self { terms, index })
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// Sparse occurrence counts over a vocabulary of width `dim`.
///
/// Only nonzero entries are stored, in ascending index order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountVector {
    dim: usize,
    counts: BTreeMap<usize, u32>,
}

impl CountVector {
    /// The all-zero vector of width `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            counts: BTreeMap::new(),
        }
    }

    /// Build from explicit `(index, count)` pairs. Repeated indices add up
    /// and zero counts are ignored; an index outside `0..dim` is rejected.
    pub fn from_counts<I>(dim: usize, entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        let mut vector = Self::zeros(dim);
        for (index, count) in entries {
            if index >= dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    found: index + 1,
                });
            }
            if count > 0 {
                *vector.counts.entry(index).or_insert(0) += count;
            }
        }
        Ok(vector)
    }

    pub(crate) fn increment(&mut self, index: usize) {
        debug_assert!(index < self.dim);
        *self.counts.entry(index).or_insert(0) += 1;
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, index: usize) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    /// Nonzero `(index, count)` entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts.iter().map(|(&i, &c)| (i, c))
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.counts.len()
    }

    pub fn is_zero(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }
}

/// Distinct features of a document, in first-occurrence order.
pub(crate) fn distinct<'a>(features: &'a [String]) -> Vec<&'a str> {
    let mut seen = HashSet::with_capacity(features.len());
    features
        .iter()
        .map(String::as_str)
        .filter(|f| seen.insert(*f))
        .collect()
}

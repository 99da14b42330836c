// Closed set of category labels fixed at training time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Index of a category within its ClassSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered, non-empty set of distinct labels in first-seen training order.
///
/// Every prediction is a ClassId into this set, so a predicted label is
/// always one of `labels()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassSet {
    labels: Vec<String>,
    index: HashMap<String, ClassId>,
}

impl ClassSet {
    /// Collect distinct labels in first-seen order and map every input label
    /// to its ClassId.
    pub fn from_labels<L: AsRef<str>>(labels: &[L]) -> Result<(Self, Vec<ClassId>), ModelError> {
        if labels.is_empty() {
            return Err(ModelError::InsufficientData("no labels".to_string()));
        }

        let mut set = ClassSet {
            labels: Vec::new(),
            index: HashMap::new(),
        };
        let mut ids = Vec::with_capacity(labels.len());
        for (row, label) in labels.iter().enumerate() {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(ModelError::InsufficientData(format!(
                    "blank label at row {row}"
                )));
            }
            let id = match set.index.get(label) {
                Some(&id) => id,
                None => {
                    let id = ClassId(set.labels.len());
                    set.labels.push(label.to_string());
                    set.index.insert(label.to_string(), id);
                    id
                }
            };
            ids.push(id);
        }
        Ok((set, ids))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn id(&self, label: &str) -> Option<ClassId> {
        self.index.get(label).copied()
    }

    pub fn label(&self, id: ClassId) -> &str {
        &self.labels[id.0]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.labels.len()).map(ClassId)
    }
}

impl TryFrom<Vec<String>> for ClassSet {
    type Error = ModelError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        let (set, _) = ClassSet::from_labels(&labels)?;
        if set.len() != labels.len() {
            return Err(ModelError::InvalidParameter(
                "duplicate label in class set".to_string(),
            ));
        }
        Ok(set)
    }
}

impl From<ClassSet> for Vec<String> {
    fn from(set: ClassSet) -> Self {
        set.labels
    }
}

//! Label encoding for classification targets

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A class label as it appeared in the target column
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Integer(v) => write!(f, "{}", v),
            Label::Text(v) => f.write_str(v),
        }
    }
}

/// Maps class labels to integer codes `0..n_classes` and back.
///
/// Codes follow the sorted order of the distinct labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<Label>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, labels: &[Label]) -> Result<&mut Self> {
        if labels.is_empty() {
            return Err(Error::InsufficientData);
        }
        self.classes = labels.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        Ok(self)
    }

    pub fn transform(&self, labels: &[Label]) -> Result<Vec<usize>> {
        if self.classes.is_empty() {
            return Err(Error::ModelNotFitted);
        }
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| Error::DataError(format!("unseen label: {}", label)))
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[Label]) -> Result<Vec<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<Label>> {
        if self.classes.is_empty() {
            return Err(Error::ModelNotFitted);
        }
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code).cloned().ok_or_else(|| {
                    Error::InferenceError(format!(
                        "class code {} outside 0..{}",
                        code,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single submitted answer, before it is matched against its field.
///
/// Scalar fields and single-choice fields send a string; checkbox fields send
/// a list of option ids. The JSON shape decides the variant. Any other JSON
/// value lands in `Other` so the request still parses and the mismatch can be
/// reported against the field it was sent for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Many(Vec<String>),
    Other(Value),
}

impl Answer {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Answer::Single(value) => Some(value),
            Answer::Many(_) | Answer::Other(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Answer::Single(_) | Answer::Other(_) => None,
            Answer::Many(values) => Some(values),
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Single(value.to_string())
    }
}

impl From<Vec<String>> for Answer {
    fn from(values: Vec<String>) -> Self {
        Answer::Many(values)
    }
}

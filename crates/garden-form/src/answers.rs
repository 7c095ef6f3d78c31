use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A recorded answer, tagged by the kind of field that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// Selection from a radio list, the consent prompt or the MBTI grid.
    Choice(String),
    /// Free text from a textarea or single-line input.
    Text(String),
}

impl AnswerValue {
    pub fn as_str(&self) -> &str {
        match self {
            AnswerValue::Choice(value) | AnswerValue::Text(value) => value,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, AnswerValue::Choice(_))
    }
}

/// In-progress answers keyed by question order number. Last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap {
    entries: BTreeMap<u32, AnswerValue>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer and returns the value it replaced, if any.
    pub fn set(&mut self, order_number: u32, value: AnswerValue) -> Option<AnswerValue> {
        self.entries.insert(order_number, value)
    }

    pub fn get(&self, order_number: u32) -> Option<&AnswerValue> {
        self.entries.get(&order_number)
    }

    pub fn contains(&self, order_number: u32) -> bool {
        self.entries.contains_key(&order_number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AnswerValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

impl FromIterator<(u32, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (u32, AnswerValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Optional envelope metadata attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

/// Submission envelope handed to storage collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub form_id: String,
    pub spec_version: String,
    pub answers: AnswerMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl AnswerSet {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<u32>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub missing_required: Vec<u32>,
    #[serde(default)]
    pub unknown_fields: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_answers_replace_earlier_ones() {
        let mut answers = AnswerMap::new();
        answers.set(1, AnswerValue::Text("first".into()));
        let previous = answers.set(1, AnswerValue::Text("second".into()));
        assert_eq!(previous, Some(AnswerValue::Text("first".into())));
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(1).map(AnswerValue::as_str), Some("second"));
    }

    #[test]
    fn answers_serialize_keyed_by_order_number() {
        let answers = AnswerMap::from_iter([(3, AnswerValue::Choice("Yes".into()))]);
        let value = serde_json::to_value(&answers).expect("serialize");
        assert_eq!(value, json!({ "3": { "kind": "choice", "value": "Yes" } }));
        let back: AnswerMap = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, answers);
    }

    #[test]
    fn answer_set_survives_cbor() {
        let set = AnswerSet {
            form_id: "garden".into(),
            spec_version: "1.0".into(),
            answers: AnswerMap::from_iter([(1, AnswerValue::Text("Ada".into()))]),
            meta: None,
        };
        let bytes = set.to_cbor().expect("cbor");
        assert_eq!(AnswerSet::from_cbor(&bytes).expect("decode"), set);
    }
}

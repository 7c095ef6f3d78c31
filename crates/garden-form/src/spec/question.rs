use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Declared type of a question as it appears in the form definition.
///
/// Anything other than `radio` and `textarea` is a native input kind
/// (`text`, `email`, `date`, ...) and is passed through to the input as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Radio,
    Textarea,
    Text,
    Other(String),
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::Radio => "radio",
            QuestionType::Textarea => "textarea",
            QuestionType::Text => "text",
            QuestionType::Other(kind) => kind,
        }
    }

    /// Native input kind used when the question falls through to a single-line input.
    pub fn input_kind(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "radio" => QuestionType::Radio,
            "textarea" => QuestionType::Textarea,
            "text" => QuestionType::Text,
            _ => QuestionType::Other(value),
        }
    }
}

impl From<&str> for QuestionType {
    fn from(value: &str) -> Self {
        QuestionType::from(value.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radio options, either already structured or stored as a JSON-encoded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QuestionOptions {
    List(Vec<String>),
    Encoded(String),
}

impl QuestionOptions {
    /// Decodes the options into an ordered list.
    pub fn decode(&self, order_number: u32) -> Result<Vec<String>, FormError> {
        match self {
            QuestionOptions::List(options) => Ok(options.clone()),
            QuestionOptions::Encoded(raw) => {
                serde_json::from_str::<Vec<String>>(raw).map_err(|err| {
                    FormError::MalformedQuestion {
                        order_number,
                        reason: format!("options are not a JSON list of strings: {}", err),
                    }
                })
            }
        }
    }
}

impl From<Vec<String>> for QuestionOptions {
    fn from(value: Vec<String>) -> Self {
        QuestionOptions::List(value)
    }
}

/// A single application question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub order_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<QuestionOptions>,
    #[serde(default)]
    pub required: bool,
}

impl QuestionSpec {
    /// Section name, falling back to `default_section` when the question has none.
    pub fn section_or<'a>(&'a self, default_section: &'a str) -> &'a str {
        self.section
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(default_section)
    }

    /// Decoded radio options, or `None` when the question declares none.
    pub fn decoded_options(&self) -> Result<Option<Vec<String>>, FormError> {
        self.options
            .as_ref()
            .map(|options| options.decode(self.order_number))
            .transpose()
    }

    pub fn mentions(&self, marker: &str) -> bool {
        !marker.is_empty()
            && self
                .text
                .to_lowercase()
                .contains(&marker.to_lowercase())
    }
}

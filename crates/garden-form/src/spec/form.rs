use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::spec::question::QuestionSpec;

pub const DEFAULT_CONSENT_ORDER_NUMBER: u32 = 3;
pub const DEFAULT_CONSENT_AFFIRMATIVE: &str = "Yes";
pub const DEFAULT_MBTI_MARKER: &str = "mbti";
pub const DEFAULT_SECTION: &str = "Other";

/// Presentation copy for a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct FormPresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Lines shown above the consent prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consent_intro: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_prompt: Option<String>,
}

/// Behaviour knobs that the form definition may override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FormPolicy {
    #[serde(default = "default_consent_order_number")]
    pub consent_order_number: u32,
    #[serde(default = "default_consent_affirmative")]
    pub consent_affirmative: String,
    #[serde(default = "default_mbti_marker")]
    pub mbti_marker: String,
    #[serde(default = "default_section")]
    pub default_section: String,
}

impl Default for FormPolicy {
    fn default() -> Self {
        Self {
            consent_order_number: DEFAULT_CONSENT_ORDER_NUMBER,
            consent_affirmative: DEFAULT_CONSENT_AFFIRMATIVE.to_string(),
            mbti_marker: DEFAULT_MBTI_MARKER.to_string(),
            default_section: DEFAULT_SECTION.to_string(),
        }
    }
}

fn default_consent_order_number() -> u32 {
    DEFAULT_CONSENT_ORDER_NUMBER
}

fn default_consent_affirmative() -> String {
    DEFAULT_CONSENT_AFFIRMATIVE.to_string()
}

fn default_mbti_marker() -> String {
    DEFAULT_MBTI_MARKER.to_string()
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

/// Top-level application form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<FormPresentation>,
    #[serde(default)]
    pub policy: FormPolicy,
    pub questions: Vec<QuestionSpec>,
}

impl FormSpec {
    /// Parses a form definition and checks that order numbers are unique.
    pub fn from_json(raw: &str) -> Result<Self, FormError> {
        let spec: FormSpec = serde_json::from_str(raw)?;
        spec.check()?;
        Ok(spec)
    }

    pub fn check(&self) -> Result<(), FormError> {
        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.order_number) {
                return Err(FormError::DuplicateOrder(question.order_number));
            }
        }
        Ok(())
    }

    /// Questions sorted by order number.
    pub fn ordered_questions(&self) -> Vec<&QuestionSpec> {
        let mut questions = self.questions.iter().collect::<Vec<_>>();
        questions.sort_by_key(|question| question.order_number);
        questions
    }

    pub fn question(&self, order_number: u32) -> Option<&QuestionSpec> {
        self.questions
            .iter()
            .find(|question| question.order_number == order_number)
    }

    pub fn help(&self) -> Option<&str> {
        self.presentation
            .as_ref()
            .and_then(|presentation| presentation.intro.as_deref())
            .or(self.description.as_deref())
    }
}

use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerMap, AnswerValue},
    error::FormError,
    navigator::{Progress, SectionNavigator, SectionTab},
    spec::{FormPolicy, FormPresentation, FormSpec, QuestionSpec, QuestionType},
};

/// The sixteen Myers-Briggs type codes, in grid order.
pub const MBTI_TYPES: [&str; 16] = [
    "INTJ", "INTP", "ENTJ", "ENTP", "INFJ", "INFP", "ENFJ", "ENFP", "ISTJ", "ISFJ", "ESTJ",
    "ESFJ", "ISTP", "ISFP", "ESTP", "ESFP",
];

const DEFAULT_CONSENT_INTRO: [&str; 5] = [
    "COMPLETING THIS APPLICATION IS NOT A CONFIRMED ENTRY TO THE GARDEN",
    "This is a curated place, unlike any other.",
    "We seek those with the attention span & curiosity to complete this application.",
    "We're not impressed by your followers, fortune, or fame [though none of those exclude you].",
    "We seek the realest.",
];

const DEFAULT_CONSENT_PROMPT: &str = "Do you consent to your data being stored and reviewed?";

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Earlier sections remain; the caller shows "Next".
    InProgress,
    /// Last section is active; the caller shows "Submit".
    ReadyToSubmit,
    /// A submission is in flight; submit is disabled.
    Submitting,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::InProgress => "in_progress",
            RenderStatus::ReadyToSubmit => "ready_to_submit",
            RenderStatus::Submitting => "submitting",
        }
    }
}

/// Presentation chosen for a question.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Fixed single-select grid of the MBTI codes.
    MbtiGrid { choices: Vec<String> },
    /// Consent question with its introductory copy.
    Consent {
        intro: Vec<String>,
        prompt: String,
        options: Vec<String>,
    },
    Radio { options: Vec<String> },
    Textarea,
    /// Single-line input; `input_kind` is the declared type, uninterpreted.
    Input { input_kind: String },
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::MbtiGrid { .. } => "mbti_grid",
            FieldKind::Consent { .. } => "consent",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Textarea => "textarea",
            FieldKind::Input { .. } => "input",
        }
    }
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub order_number: u32,
    pub title: String,
    pub required: bool,
    pub current_value: Option<AnswerValue>,
    pub kind: FieldKind,
}

impl RenderedField {
    /// Choices offered by single-select fields.
    pub fn choices(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::MbtiGrid { choices } => Some(choices),
            FieldKind::Consent { options, .. } | FieldKind::Radio { options } => Some(options),
            FieldKind::Textarea | FieldKind::Input { .. } => None,
        }
    }

    /// Wraps raw input in the answer variant this field produces.
    pub fn answer_for(&self, raw: impl Into<String>) -> AnswerValue {
        if self.choices().is_some() {
            AnswerValue::Choice(raw.into())
        } else {
            AnswerValue::Text(raw.into())
        }
    }

    pub fn is_consent(&self) -> bool {
        matches!(self.kind, FieldKind::Consent { .. })
    }
}

/// Picks the presentation for `question`. The first matching rule wins:
/// MBTI marker in the text, radio with options (consent when the order
/// number matches the policy), textarea, then a plain input.
pub fn render_field(
    question: &QuestionSpec,
    policy: &FormPolicy,
    presentation: Option<&FormPresentation>,
    answers: &AnswerMap,
) -> Result<RenderedField, FormError> {
    let kind = if question.mentions(&policy.mbti_marker) {
        FieldKind::MbtiGrid {
            choices: MBTI_TYPES.iter().map(|code| code.to_string()).collect(),
        }
    } else if let (QuestionType::Radio, Some(options)) = (&question.kind, &question.options) {
        let options = options.decode(question.order_number)?;
        if question.order_number == policy.consent_order_number {
            consent_field(presentation, options)
        } else {
            FieldKind::Radio { options }
        }
    } else if question.kind == QuestionType::Textarea {
        FieldKind::Textarea
    } else {
        FieldKind::Input {
            input_kind: question.kind.input_kind().to_string(),
        }
    };

    Ok(RenderedField {
        order_number: question.order_number,
        title: question.text.clone(),
        required: question.required,
        current_value: answers.get(question.order_number).cloned(),
        kind,
    })
}

fn consent_field(presentation: Option<&FormPresentation>, options: Vec<String>) -> FieldKind {
    let intro = presentation
        .map(|presentation| presentation.consent_intro.clone())
        .filter(|lines| !lines.is_empty())
        .unwrap_or_else(|| DEFAULT_CONSENT_INTRO.iter().map(|line| line.to_string()).collect());
    let prompt = presentation
        .and_then(|presentation| presentation.consent_prompt.clone())
        .unwrap_or_else(|| DEFAULT_CONSENT_PROMPT.to_string());
    FieldKind::Consent {
        intro,
        prompt,
        options,
    }
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub form_version: String,
    pub status: RenderStatus,
    pub help: Option<String>,
    pub section_index: usize,
    pub section_name: Option<String>,
    pub tabs: Vec<SectionTab>,
    pub progress: Progress,
    pub fields: Vec<RenderedField>,
}

impl RenderPayload {
    pub fn field(&self, order_number: u32) -> Option<&RenderedField> {
        self.fields
            .iter()
            .find(|field| field.order_number == order_number)
    }
}

/// Build the payload for the navigator's current section.
pub fn build_render_payload(
    spec: &FormSpec,
    navigator: &SectionNavigator,
    answers: &AnswerMap,
    submitting: bool,
) -> Result<RenderPayload, FormError> {
    let section = navigator.current_section();
    let fields = section
        .map(|section| {
            section
                .questions
                .iter()
                .map(|question| {
                    render_field(question, &spec.policy, spec.presentation.as_ref(), answers)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    let status = if submitting {
        RenderStatus::Submitting
    } else if navigator.is_last() {
        RenderStatus::ReadyToSubmit
    } else {
        RenderStatus::InProgress
    };

    Ok(RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        form_version: spec.version.clone(),
        status,
        help: spec.help().map(String::from),
        section_index: navigator.current_index(),
        section_name: section.map(|section| section.name.clone()),
        tabs: navigator.tabs(),
        progress: navigator.progress(answers),
        fields,
    })
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("order_number".into(), json!(field.order_number));
            map.insert("title".into(), Value::String(field.title.clone()));
            map.insert("kind".into(), Value::String(field.kind.label().into()));
            map.insert("required".into(), Value::Bool(field.required));
            match &field.kind {
                FieldKind::Input { input_kind } => {
                    map.insert("input_kind".into(), Value::String(input_kind.clone()));
                }
                FieldKind::Consent { intro, prompt, .. } => {
                    map.insert("intro".into(), json!(intro));
                    map.insert("prompt".into(), Value::String(prompt.clone()));
                }
                _ => {}
            }
            if let Some(choices) = field.choices() {
                map.insert("choices".into(), json!(choices));
            }
            if let Some(value) = &field.current_value {
                map.insert("current_value".into(), Value::String(value.as_str().into()));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    let tabs = payload
        .tabs
        .iter()
        .map(|tab| json!({ "index": tab.index, "name": tab.name, "active": tab.active }))
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "form_version": payload.form_version,
        "status": payload.status.as_str(),
        "help": payload.help,
        "section": {
            "index": payload.section_index,
            "name": payload.section_name,
        },
        "tabs": tabs,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
            "percent": payload.progress.percent(),
        },
        "fields": fields,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} ({})", payload.form_title, payload.form_id));

    let tabs = payload
        .tabs
        .iter()
        .map(|tab| {
            if tab.active {
                format!("[{}] {} ▲", tab.index + 1, tab.name)
            } else {
                format!("[{}] {}", tab.index + 1, tab.name)
            }
        })
        .collect::<Vec<_>>();
    if !tabs.is_empty() {
        lines.push(tabs.join("  "));
    }
    lines.push(format!(
        "Progress: {:.0}% ({}/{})",
        payload.progress.percent(),
        payload.progress.answered,
        payload.progress.total
    ));

    for field in &payload.fields {
        lines.push(String::new());
        if let FieldKind::Consent { intro, prompt, .. } = &field.kind {
            lines.extend(intro.iter().cloned());
            lines.push(format!("#{} {}", field.order_number, prompt));
        } else {
            let mut title = format!("#{} {}", field.order_number, field.title);
            if field.required {
                title.push_str(" *");
            }
            lines.push(title);
        }
        match &field.kind {
            FieldKind::MbtiGrid { choices } => {
                for row in choices.chunks(4) {
                    lines.push(format!("  {}", row.join("  ")));
                }
            }
            FieldKind::Consent { options, .. } | FieldKind::Radio { options } => {
                for option in options {
                    let marker = match &field.current_value {
                        Some(value) if value.as_str() == option => "(x)",
                        _ => "( )",
                    };
                    lines.push(format!("  {} {}", marker, option));
                }
            }
            FieldKind::Textarea => lines.push("  (multi-line text)".to_string()),
            FieldKind::Input { input_kind } => lines.push(format!("  ({})", input_kind)),
        }
        if let Some(value) = &field.current_value
            && field.choices().is_none()
        {
            lines.push(format!("  = {}", value.as_str()));
        }
    }

    lines.push(String::new());
    lines.push(format!("Status: {}", payload.status.as_str()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::QuestionOptions;

    fn question(order_number: u32, text: &str, kind: &str, options: Option<Vec<&str>>) -> QuestionSpec {
        QuestionSpec {
            order_number,
            section: None,
            text: text.into(),
            kind: QuestionType::from(kind),
            options: options
                .map(|options| QuestionOptions::List(options.into_iter().map(String::from).collect())),
            required: false,
        }
    }

    #[test]
    fn mbti_marker_overrides_declared_type() {
        let question = question(5, "What is your MBTI type?", "radio", Some(vec!["one"]));
        let field =
            render_field(&question, &FormPolicy::default(), None, &AnswerMap::new()).unwrap();
        let choices = field.choices().expect("choices");
        assert_eq!(choices.len(), 16);
        assert_eq!(choices, MBTI_TYPES.map(String::from).as_slice());
    }

    #[test]
    fn consent_question_gets_intro_copy() {
        let question = question(3, "Consent", "radio", Some(vec!["Yes", "No"]));
        let field =
            render_field(&question, &FormPolicy::default(), None, &AnswerMap::new()).unwrap();
        match &field.kind {
            FieldKind::Consent { intro, prompt, options } => {
                assert!(!intro.is_empty());
                assert_eq!(prompt, DEFAULT_CONSENT_PROMPT);
                assert_eq!(options, &vec!["Yes".to_string(), "No".to_string()]);
            }
            other => panic!("expected consent field, got {:?}", other),
        }
    }

    #[test]
    fn radio_without_options_falls_through_to_input() {
        let question = question(6, "Radio with nothing", "radio", None);
        let field =
            render_field(&question, &FormPolicy::default(), None, &AnswerMap::new()).unwrap();
        assert_eq!(
            field.kind,
            FieldKind::Input {
                input_kind: "radio".into()
            }
        );
    }

    #[test]
    fn declared_type_passes_through_to_input_kind() {
        let question = question(9, "Birthday", "date", None);
        let field =
            render_field(&question, &FormPolicy::default(), None, &AnswerMap::new()).unwrap();
        assert_eq!(
            field.kind,
            FieldKind::Input {
                input_kind: "date".into()
            }
        );
        assert_eq!(field.answer_for("2024-01-01"), AnswerValue::Text("2024-01-01".into()));
    }

    #[test]
    fn malformed_options_surface_as_error() {
        let mut question = question(4, "Pick", "radio", None);
        question.options = Some(QuestionOptions::Encoded("not-json".into()));
        let err = render_field(&question, &FormPolicy::default(), None, &AnswerMap::new())
            .expect_err("malformed");
        assert!(matches!(err, FormError::MalformedQuestion { order_number: 4, .. }));
    }
}

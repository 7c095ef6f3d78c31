use std::collections::BTreeSet;

use crate::answers::{AnswerMap, AnswerValue, ValidationError, ValidationResult};
use crate::render::render_field;
use crate::spec::FormSpec;

/// Checks answers against the form. Navigation never calls this; callers
/// decide whether to run it before submitting.
pub fn validate(spec: &FormSpec, answers: &AnswerMap) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for question in spec.ordered_questions() {
        let field = match render_field(question, &spec.policy, spec.presentation.as_ref(), answers)
        {
            Ok(field) => field,
            Err(err) => {
                errors.push(base_error(
                    question.order_number,
                    &err.to_string(),
                    "malformed_question",
                ));
                continue;
            }
        };

        match answers.get(question.order_number) {
            None => {
                if question.required {
                    missing_required.push(question.order_number);
                }
            }
            Some(value) => {
                if let Some(error) = validate_value(field.order_number, field.choices(), value) {
                    errors.push(error);
                }
            }
        }
    }

    let all_orders: BTreeSet<_> = spec
        .questions
        .iter()
        .map(|question| question.order_number)
        .collect();
    let unknown_fields: Vec<u32> = answers
        .keys()
        .filter(|key| !all_orders.contains(key))
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

fn validate_value(
    order_number: u32,
    choices: Option<&[String]>,
    value: &AnswerValue,
) -> Option<ValidationError> {
    match (choices, value) {
        (Some(choices), AnswerValue::Choice(choice)) => {
            if choices.iter().any(|candidate| candidate == choice) {
                None
            } else {
                Some(base_error(order_number, "invalid choice", "choice_mismatch"))
            }
        }
        (Some(_), AnswerValue::Text(_)) | (None, AnswerValue::Choice(_)) => {
            Some(base_error(order_number, "answer kind mismatch", "kind_mismatch"))
        }
        (None, AnswerValue::Text(_)) => None,
    }
}

fn base_error(order_number: u32, message: &str, code: &str) -> ValidationError {
    ValidationError {
        order_number: Some(order_number),
        message: message.into(),
        code: Some(code.into()),
    }
}

use serde_json::{Map, Value, json};

use crate::render::render_field;
use crate::spec::FormSpec;
use crate::{AnswerMap, FormError};

/// JSON schema of the form definition format itself.
pub fn form_schema() -> Result<Value, FormError> {
    let schema = schemars::schema_for!(FormSpec);
    Ok(serde_json::to_value(schema)?)
}

/// JSON schema describing a valid answer map for `spec`.
pub fn answers_schema(spec: &FormSpec) -> Result<Value, FormError> {
    let empty = AnswerMap::new();
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in spec.ordered_questions() {
        let field = render_field(question, &spec.policy, spec.presentation.as_ref(), &empty)?;
        let value_schema = match field.choices() {
            Some(choices) => json!({ "type": "string", "enum": choices }),
            None => json!({ "type": "string" }),
        };
        let kind = if field.choices().is_some() { "choice" } else { "text" };
        properties.insert(
            question.order_number.to_string(),
            json!({
                "type": "object",
                "title": question.text,
                "properties": {
                    "kind": { "const": kind },
                    "value": value_schema,
                },
                "required": ["kind", "value"],
            }),
        );
        if question.required {
            required.push(Value::String(question.order_number.to_string()));
        }
    }

    Ok(json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": format!("{} answers", spec.title),
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    }))
}

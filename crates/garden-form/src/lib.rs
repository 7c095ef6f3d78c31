#![allow(missing_docs)]

pub mod access;
pub mod answers;
pub mod application;
pub mod error;
pub mod navigator;
pub mod render;
pub mod schema;
pub mod sections;
pub mod spec;
pub mod submit;
pub mod validate;
pub mod weeks;

pub use access::{AppView, ApplicationStatus, Page, Role, Session, resolve_view};
pub use answers::{AnswerMap, AnswerSet, AnswerValue, Meta, ValidationError, ValidationResult};
pub use application::{AnswerEffect, ApplicationForm};
pub use error::{FormError, SubmitError, WeekError};
pub use navigator::{Progress, SectionNavigator, SectionTab};
pub use render::{
    FieldKind, MBTI_TYPES, RenderPayload, RenderStatus, RenderedField, build_render_payload,
    render_field, render_json_ui, render_text,
};
pub use schema::{answers_schema, form_schema};
pub use sections::{Section, partition};
pub use spec::{FormPolicy, FormPresentation, FormSpec, QuestionOptions, QuestionSpec, QuestionType};
pub use submit::{SubmissionGate, SubmitHandler, SubmitOutcome};
pub use validate::validate;
pub use weeks::{WeekCell, WeekRange, WeekSelection, week_end, weekly_sequence};

pub mod form;
pub mod question;

pub use form::{FormPolicy, FormPresentation, FormSpec};
pub use question::{QuestionOptions, QuestionSpec, QuestionType};

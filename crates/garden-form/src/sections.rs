use indexmap::IndexMap;

use crate::spec::{FormSpec, QuestionSpec};

/// A named group of questions shown together.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub questions: Vec<QuestionSpec>,
}

impl Section {
    pub fn order_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.questions.iter().map(|question| question.order_number)
    }
}

/// Groups the form's questions by section.
///
/// Questions are visited in order-number order; sections keep the order in
/// which their names are first seen during that scan.
pub fn partition(spec: &FormSpec) -> Vec<Section> {
    let mut grouped: IndexMap<String, Vec<QuestionSpec>> = IndexMap::new();
    for question in spec.ordered_questions() {
        let name = question.section_or(&spec.policy.default_section);
        grouped
            .entry(name.to_string())
            .or_default()
            .push(question.clone());
    }

    grouped
        .into_iter()
        .map(|(name, questions)| Section { name, questions })
        .collect()
}

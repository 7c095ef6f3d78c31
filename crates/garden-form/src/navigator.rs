use std::collections::BTreeSet;

use tracing::debug;

use crate::answers::AnswerMap;
use crate::sections::{Section, partition};
use crate::spec::FormSpec;

/// Answered/total counters for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage in `[0, 100]`; an empty form reports 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.answered.min(self.total) as f64 / self.total as f64) * 100.0
    }
}

/// Entry in the section tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTab {
    pub index: usize,
    pub name: String,
    pub active: bool,
}

/// Tracks which section of the form is on screen.
#[derive(Debug, Clone)]
pub struct SectionNavigator {
    sections: Vec<Section>,
    order_numbers: BTreeSet<u32>,
    current: usize,
}

impl SectionNavigator {
    pub fn new(spec: &FormSpec) -> Self {
        Self::from_sections(partition(spec))
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        let order_numbers = sections
            .iter()
            .flat_map(|section| section.order_numbers())
            .collect();
        Self {
            sections,
            order_numbers,
            current: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current)
    }

    fn last_index(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current >= self.last_index()
    }

    /// Moves to the next section; stays put on the last one.
    pub fn advance(&mut self) {
        let next = (self.current + 1).min(self.last_index());
        debug!(from = self.current, to = next, "advance section");
        self.current = next;
    }

    /// Moves to the previous section; stays put on the first one.
    pub fn retreat(&mut self) {
        let previous = self.current.saturating_sub(1);
        debug!(from = self.current, to = previous, "retreat section");
        self.current = previous;
    }

    /// Jumps to a section tab. Returns `false` and leaves the index untouched
    /// when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.sections.len() {
            debug!(from = self.current, to = index, "jump to section");
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn tabs(&self) -> Vec<SectionTab> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, section)| SectionTab {
                index,
                name: section.name.clone(),
                active: index == self.current,
            })
            .collect()
    }

    /// Counts distinct answered questions of this form. An answer recorded as
    /// an empty string still counts.
    pub fn progress(&self, answers: &AnswerMap) -> Progress {
        let answered = answers
            .keys()
            .filter(|order_number| self.order_numbers.contains(order_number))
            .count();
        Progress {
            answered,
            total: self.order_numbers.len(),
        }
    }
}

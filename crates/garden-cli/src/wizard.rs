use std::fmt::Write;

use garden_form::{
    AnswerSet, FieldKind, RenderPayload, RenderedField, ValidationResult, WeekCell,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: section headers and prompts only.
    Clean,
    /// Verbose output: progress, tabs, help text.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints the application form as the applicant moves through it.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("{}", payload.form_title);
        if self.verbosity.is_verbose()
            && let Some(help) = &payload.help
        {
            println!("Help: {}", help);
        }
        self.header_printed = true;
    }

    pub fn show_section(&self, payload: &RenderPayload) {
        let name = payload.section_name.as_deref().unwrap_or("(no questions)");
        println!(
            "== {}/{} {} ==",
            payload.section_index + 1,
            payload.tabs.len().max(1),
            name
        );
        if self.verbosity.is_verbose() {
            let tabs = payload
                .tabs
                .iter()
                .map(|tab| {
                    if tab.active {
                        format!("{} ▲", tab.name)
                    } else {
                        tab.name.clone()
                    }
                })
                .collect::<Vec<_>>();
            println!("Sections: {}", tabs.join(" | "));
            println!(
                "Progress: {:.0}% ({}/{})",
                payload.progress.percent(),
                payload.progress.answered,
                payload.progress.total
            );
        }
    }

    pub fn show_prompt(&self, field: &RenderedField) {
        if let FieldKind::Consent { intro, prompt, .. } = &field.kind {
            for line in intro {
                println!("{}", line);
            }
            println!("{}", prompt);
        } else {
            let mut line = format!("#{} {}", field.order_number, field.title);
            if field.required {
                line.push_str(" *");
            }
            println!("{}", line);
        }
        match &field.kind {
            FieldKind::MbtiGrid { choices } => {
                for row in choices.chunks(4) {
                    println!("  {}", row.join("  "));
                }
            }
            FieldKind::Consent { options, .. } | FieldKind::Radio { options } => {
                println!("  ({})", options.join("/"));
            }
            FieldKind::Textarea => println!("  (text; use \\n for line breaks)"),
            FieldKind::Input { input_kind } if self.verbosity.is_verbose() => {
                println!("  ({})", input_kind);
            }
            FieldKind::Input { .. } => {}
        }
        if let Some(value) = &field.current_value {
            println!("  current: {}", value.as_str());
        }
    }

    pub fn show_navigation(&self, payload: &RenderPayload, is_last: bool) {
        let mut options = Vec::new();
        if payload.section_index > 0 {
            options.push("[p]revious");
        }
        if is_last {
            options.push("[s]ubmit");
        } else {
            options.push("[n]ext");
        }
        options.push("[g]oto N");
        options.push("e[x]it");
        println!("{}", options.join(", "));
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message
            && self.verbosity.is_verbose()
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_validation(&self, result: &ValidationResult) {
        if !result.missing_required.is_empty() {
            let missing = result
                .missing_required
                .iter()
                .map(|order| format!("#{}", order))
                .collect::<Vec<_>>();
            println!("Unanswered required questions: {}", missing.join(", "));
        }
    }

    pub fn show_completion(&self, answer_set: &AnswerSet) {
        println!("Application submitted ✅");
        match answer_set.to_cbor() {
            Ok(bytes) => {
                println!("Answers (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize answers to CBOR: {}", err);
            }
        }
        if self.show_answers_json {
            match answer_set.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize answers to JSON: {}", err);
                }
            }
        }
    }
}

/// One line per week: index, dates and selection markers.
pub fn format_week_cell(cell: &WeekCell) -> String {
    let mut markers = Vec::new();
    if cell.selected {
        markers.push("selected");
    }
    if cell.first_selected {
        markers.push("first");
    }
    if cell.edge {
        markers.push("edge");
    }
    if cell.consecutive {
        markers.push("extendable");
    }
    let mut line = format!(
        "{:>2}. {} – {}",
        cell.index + 1,
        cell.start.format("%b %d"),
        cell.end.format("%b %d")
    );
    if !markers.is_empty() {
        line.push_str(&format!(" [{}]", markers.join(", ")));
    }
    line
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut encoded, "{:02x}", byte);
    }
    encoded
}

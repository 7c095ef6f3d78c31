mod handler;
mod wizard;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use garden_form::{
    AnswerMap, AnswerValue, AppView, ApplicationForm, FieldKind, FormSpec, RenderPayload,
    RenderedField, Session, SubmitOutcome, ValidationResult, WeekError, WeekSelection,
    answers_schema, form_schema, render_json_ui, render_text, resolve_view, validate,
    weekly_sequence,
};
use handler::FileSubmitHandler;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{AnswerParseError, Verbosity, WizardPresenter, format_week_cell};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "GARDEN_LOG";
const SUBMIT_DIR_ENV: &str = "GARDEN_SUBMIT_DIR";
const DEFAULT_LOG_FILTER: &str = "garden=info";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "The Garden application shell",
    long_about = "Walks through the application form section by section, checks answers, and inspects week selections and session access"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    /// Prompts only.
    Prompt,
    /// Full section page before the prompts.
    Page,
    /// Structured JSON of the section before the prompts.
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Fill in the application form interactively and submit it.
    Apply {
        /// Path to the FormSpec JSON describing the application.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Optional JSON file containing answers to resume from.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Directory receiving the submitted answers (defaults to GARDEN_SUBMIT_DIR or the current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Applicant identifier recorded with the submission.
        #[arg(long)]
        applicant: Option<String>,
        /// Show progress, section tabs and parse expectations.
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also print the submitted answers as JSON.
        #[arg(long)]
        answers_json: bool,
        /// How each section is displayed.
        #[arg(long, value_enum, default_value_t = RenderMode::Prompt)]
        format: RenderMode,
    },
    /// Validate answers against a FormSpec.
    Validate {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the week grid for a booking window and describe a selection.
    Weeks {
        /// First week-start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// Number of weeks offered.
        #[arg(long, default_value_t = 12)]
        count: usize,
        /// Selected week-start dates, in selection order.
        #[arg(long = "select", value_name = "DATE")]
        selected: Vec<NaiveDate>,
    },
    /// Show which view and pages a session resolves to.
    Access {
        /// Session claims JSON; omit for a signed-out visitor.
        #[arg(long, value_name = "SESSION")]
        session: Option<PathBuf>,
        /// Optional path to resolve against the view.
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the JSON schema of the form format, or of the answers for one form.
    Schema {
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Apply {
            spec,
            answers,
            out,
            applicant,
            verbose,
            answers_json,
            format,
        } => {
            let options = ApplyOptions {
                out,
                applicant,
                verbose,
                answers_json,
                format,
            };
            run_apply(spec, answers, options).await
        }
        Command::Validate { spec, answers } => run_validate(spec, answers),
        Command::Weeks {
            start,
            count,
            selected,
        } => run_weeks(start, count, selected),
        Command::Access { session, path } => run_access(session, path),
        Command::Schema { spec } => run_schema(spec),
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

struct ApplyOptions {
    out: Option<PathBuf>,
    applicant: Option<String>,
    verbose: bool,
    answers_json: bool,
    format: RenderMode,
}

fn load_spec(path: &Path) -> CliResult<FormSpec> {
    let contents = fs::read_to_string(path)?;
    Ok(FormSpec::from_json(&contents)?)
}

fn load_answers(path: Option<PathBuf>) -> CliResult<AnswerMap> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(AnswerMap::new()),
    }
}

async fn run_apply(
    spec_path: PathBuf,
    answers_path: Option<PathBuf>,
    options: ApplyOptions,
) -> CliResult<()> {
    let spec = load_spec(&spec_path)?;
    let answers = load_answers(answers_path)?;
    let out_dir = resolve_output_dir(options.out)?;
    let handler = FileSubmitHandler::new(&out_dir, &spec.id, &spec.version, options.applicant);
    let mut form = ApplicationForm::with_answers(spec, answers)?;
    let mut presenter =
        WizardPresenter::new(Verbosity::from_verbose(options.verbose), options.answers_json);

    'sections: loop {
        let payload = form.render()?;
        presenter.show_header(&payload);
        print_render_output(options.format, &payload)?;
        presenter.show_section(&payload);

        for field in &payload.fields {
            let Some(value) = prompt_field(field, &presenter)? else {
                continue;
            };
            let effect = form.answer(field.order_number, value)?;
            if effect.advanced {
                debug!(order_number = field.order_number, "consent given, moving on");
                continue 'sections;
            }
        }

        loop {
            let payload = form.render()?;
            let is_last = form.navigator().is_last();
            presenter.show_navigation(&payload, is_last);
            let line = read_line("> ")?;
            match parse_navigation(&line) {
                Ok(Navigation::Next) => {
                    form.advance();
                    continue 'sections;
                }
                Ok(Navigation::Previous) => {
                    form.retreat();
                    continue 'sections;
                }
                Ok(Navigation::Goto(number)) => {
                    if number > 0 && form.jump_to(number - 1) {
                        continue 'sections;
                    }
                    println!("There is no section {}.", number);
                }
                Ok(Navigation::Submit) => {
                    if !is_last {
                        println!("Submit is available on the last section.");
                        continue;
                    }
                    presenter.show_validation(&validate(form.spec(), form.answers()));
                    match form.submit(&handler).await {
                        Ok(SubmitOutcome::Submitted) => {
                            presenter.show_completion(&form.answer_set(None));
                            println!("Saved to {}", handler.path().display());
                            return Ok(());
                        }
                        Ok(outcome) => debug!(?outcome, "submit not performed"),
                        Err(err) => eprintln!("Submission failed: {}. Try again.", err),
                    }
                }
                Ok(Navigation::Exit) => return Err("application aborted by user".into()),
                Err(message) => eprintln!("{}", message),
            }
        }
    }
}

fn prompt_field(
    field: &RenderedField,
    presenter: &WizardPresenter,
) -> CliResult<Option<AnswerValue>> {
    loop {
        presenter.show_prompt(field);
        let line = read_line("> ")?;
        match parse_answer(field, &line) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

/// Blank input keeps the current answer. Choice input matches options
/// case-insensitively and records the option as written in the form.
fn parse_answer(field: &RenderedField, raw: &str) -> Result<Option<AnswerValue>, AnswerParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Some(choices) = field.choices() {
        return choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(trimmed))
            .map(|choice| Some(AnswerValue::Choice(choice.clone())))
            .ok_or_else(|| {
                AnswerParseError::new(
                    format!("Choose one of: {}.", choices.join(", ")),
                    Some(format!("allowed values: {}", choices.join(", "))),
                )
            });
    }

    match &field.kind {
        FieldKind::Textarea => Ok(Some(AnswerValue::Text(trimmed.replace("\\n", "\n")))),
        _ => Ok(Some(AnswerValue::Text(trimmed.to_string()))),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Navigation {
    Next,
    Previous,
    Goto(usize),
    Submit,
    Exit,
}

fn parse_navigation(raw: &str) -> Result<Navigation, String> {
    let mut parts = raw.split_whitespace();
    let command = parts.next().unwrap_or("").to_lowercase();
    match command.as_str() {
        "n" | "next" => Ok(Navigation::Next),
        "p" | "prev" | "previous" => Ok(Navigation::Previous),
        "s" | "submit" => Ok(Navigation::Submit),
        "x" | "exit" | "quit" => Ok(Navigation::Exit),
        "g" | "goto" => parts
            .next()
            .and_then(|value| value.parse::<usize>().ok())
            .map(Navigation::Goto)
            .ok_or_else(|| "goto needs a section number, e.g. `g 2`".to_string()),
        "" => Err("Choose an action.".to_string()),
        other => Err(format!("Unknown action '{}'.", other)),
    }
}

fn read_line(prompt: &str) -> CliResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err("input closed before the application was submitted".into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_render_output(mode: RenderMode, payload: &RenderPayload) -> CliResult<()> {
    match mode {
        RenderMode::Prompt => {}
        RenderMode::Page => println!("{}", render_text(payload)),
        RenderMode::Json => println!("{}", serde_json::to_string_pretty(&render_json_ui(payload))?),
    }
    Ok(())
}

fn resolve_output_dir(out: Option<PathBuf>) -> CliResult<PathBuf> {
    let candidate = match out {
        Some(path) => path,
        None => env::var_os(SUBMIT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    if candidate.as_os_str().is_empty() {
        return Err("output directory cannot be empty".into());
    }
    Ok(candidate)
}

fn run_validate(spec_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let spec = load_spec(&spec_path)?;
    let answers = load_answers(Some(answers_path))?;

    let result = validate(&spec, &answers);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            let location = error
                .order_number
                .map(|order| format!("#{}", order))
                .unwrap_or_else(|| "<unknown>".into());
            println!("  {} - {}", location, error.message);
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            join_orders(&result.missing_required)
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            join_orders(&result.unknown_fields)
        );
    }
}

fn join_orders(orders: &[u32]) -> String {
    orders
        .iter()
        .map(|order| format!("#{}", order))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_weeks(start: NaiveDate, count: usize, selected: Vec<NaiveDate>) -> CliResult<()> {
    let weeks = weekly_sequence(start, count);
    if let Some(stray) = selected.iter().find(|week| !weeks.contains(week)) {
        return Err(WeekError::NotAvailable(*stray).into());
    }

    let selection = WeekSelection::new(&weeks, &selected);
    for cell in selection.cells() {
        println!("{}", format_week_cell(&cell));
    }

    match selection.range() {
        Some(range) => println!(
            "Selected range: {} to {} ({} weeks)",
            range.start,
            range.end,
            range.weeks(&weeks).len()
        ),
        None if selected.is_empty() => println!("No weeks selected."),
        None => println!("Selection is not a consecutive run of weeks."),
    }
    Ok(())
}

fn run_access(session_path: Option<PathBuf>, path: Option<String>) -> CliResult<()> {
    let session = match session_path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Some(serde_json::from_str::<Session>(&contents)?)
        }
        None => None,
    };
    let view = resolve_view(session.as_ref());
    println!("View: {}", describe_view(&view));

    let pages = view
        .pages()
        .iter()
        .map(|page| format!("{} ({})", page.label(), page.path()))
        .collect::<Vec<_>>();
    if pages.is_empty() {
        println!("Pages: none");
    } else {
        println!("Pages: {}", pages.join(", "));
    }

    if let Some(path) = path {
        match view.route(&path) {
            Some(page) => println!("Route {}: {}", path, page.label()),
            None => println!("Route {}: not available", path),
        }
    }
    Ok(())
}

fn describe_view(view: &AppView) -> String {
    match view {
        AppView::Public => "public".into(),
        AppView::Apply => "apply".into(),
        AppView::Pending(Some(status)) => format!("pending ({})", status.as_str()),
        AppView::Pending(None) => "pending".into(),
        AppView::Member { admin: true } => "member (admin)".into(),
        AppView::Member { admin: false } => "member".into(),
    }
}

fn run_schema(spec_path: Option<PathBuf>) -> CliResult<()> {
    let schema = match spec_path {
        Some(path) => answers_schema(&load_spec(&path)?)?,
        None => form_schema()?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use garden_form::{AnswerSet, FormPolicy, QuestionSpec, QuestionType, render_field};
    use std::fs;
    use tempfile::TempDir;

    const FORM: &str = include_str!("../../garden-form/tests/fixtures/garden_form.json");

    fn field(text: &str, kind: &str, options: Option<Vec<&str>>, order_number: u32) -> RenderedField {
        let question = QuestionSpec {
            order_number,
            section: None,
            text: text.into(),
            kind: QuestionType::from(kind),
            options: options.map(|options| {
                options
                    .into_iter()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .into()
            }),
            required: true,
        };
        render_field(&question, &FormPolicy::default(), None, &AnswerMap::new()).unwrap()
    }

    #[test]
    fn parse_answer_canonicalises_choices() {
        let consent = field("Consent", "radio", Some(vec!["Yes", "No"]), 3);
        assert_eq!(
            parse_answer(&consent, "yes").unwrap(),
            Some(AnswerValue::Choice("Yes".into()))
        );
        assert!(parse_answer(&consent, "maybe").is_err());
    }

    #[test]
    fn parse_answer_blank_keeps_current() {
        let name = field("Name", "text", None, 1);
        assert_eq!(parse_answer(&name, "   ").unwrap(), None);
        assert_eq!(
            parse_answer(&name, " Ada ").unwrap(),
            Some(AnswerValue::Text("Ada".into()))
        );
    }

    #[test]
    fn parse_answer_textarea_expands_line_breaks() {
        let story = field("Story", "textarea", None, 5);
        assert_eq!(
            parse_answer(&story, r"one\ntwo").unwrap(),
            Some(AnswerValue::Text("one\ntwo".into()))
        );
    }

    #[test]
    fn parse_answer_mbti_accepts_codes() {
        let mbti = field("Your MBTI?", "text", None, 4);
        assert_eq!(
            parse_answer(&mbti, "enfp").unwrap(),
            Some(AnswerValue::Choice("ENFP".into()))
        );
    }

    #[test]
    fn parse_navigation_commands() {
        assert_eq!(parse_navigation("n"), Ok(Navigation::Next));
        assert_eq!(parse_navigation("Previous"), Ok(Navigation::Previous));
        assert_eq!(parse_navigation("g 3"), Ok(Navigation::Goto(3)));
        assert!(parse_navigation("g").is_err());
        assert!(parse_navigation("").is_err());
        assert!(parse_navigation("fly").is_err());
    }

    #[test]
    fn apply_command_walks_sections_and_submits() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = TempDir::new()?;
        let spec_path = workspace.path().join("form.json");
        fs::write(&spec_path, FORM)?;
        let out_dir = workspace.path().join("submissions");
        let input = [
            "Ada",
            "ada@example.com",
            "yes",
            "intj",
            "The day I moved.",
            "n",
            "",
            "n",
            "",
            "s",
        ];

        let mut cmd = Command::cargo_bin("garden")?;
        let assert = cmd
            .arg("apply")
            .arg("--spec")
            .arg(&spec_path)
            .arg("--out")
            .arg(&out_dir)
            .write_stdin(format!("{}\n", input.join("\n")))
            .assert()
            .success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(stdout.contains("Application submitted"));

        let written = fs::read_to_string(out_dir.join("garden-application.answers.json"))?;
        let set: AnswerSet = serde_json::from_str(&written)?;
        assert_eq!(set.answers.get(3), Some(&AnswerValue::Choice("Yes".into())));
        assert_eq!(set.answers.get(4), Some(&AnswerValue::Choice("INTJ".into())));
        assert_eq!(set.answers.len(), 5);
        Ok(())
    }

    #[test]
    fn apply_command_fails_when_input_ends() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = TempDir::new()?;
        let spec_path = workspace.path().join("form.json");
        fs::write(&spec_path, FORM)?;

        Command::cargo_bin("garden")?
            .arg("apply")
            .arg("--spec")
            .arg(&spec_path)
            .arg("--out")
            .arg(workspace.path())
            .write_stdin("Ada\n")
            .assert()
            .failure();
        Ok(())
    }

    #[test]
    fn weeks_command_reports_range() -> Result<(), Box<dyn std::error::Error>> {
        let assert = Command::cargo_bin("garden")?
            .args([
                "weeks",
                "--start",
                "2025-03-03",
                "--count",
                "4",
                "--select",
                "2025-03-10",
                "--select",
                "2025-03-17",
            ])
            .assert()
            .success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(stdout.contains("Selected range: 2025-03-10 to 2025-03-17 (2 weeks)"));
        assert!(stdout.contains("extendable"));
        Ok(())
    }

    #[test]
    fn weeks_command_handles_unordered_selection() -> Result<(), Box<dyn std::error::Error>> {
        let assert = Command::cargo_bin("garden")?
            .args([
                "weeks",
                "--start",
                "2025-03-03",
                "--count",
                "4",
                "--select",
                "2025-03-17",
                "--select",
                "2025-03-10",
                "--select",
                "2025-03-24",
            ])
            .assert()
            .success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(stdout.contains("Selected range: 2025-03-10 to 2025-03-24 (3 weeks)"));
        assert!(stdout.contains(" 1. Mar 03 – Mar 09 [extendable]"));
        Ok(())
    }

    #[test]
    fn default_log_filter_targets_the_shell() {
        assert_eq!(DEFAULT_LOG_FILTER, "garden=info");
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn weeks_command_rejects_unavailable_week() -> Result<(), Box<dyn std::error::Error>> {
        Command::cargo_bin("garden")?
            .args(["weeks", "--start", "2025-03-03", "--count", "2", "--select", "2025-06-02"])
            .assert()
            .failure();
        Ok(())
    }

    #[test]
    fn access_command_hides_admin_from_members() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let session_path = workspace.path().join("session.json");
        fs::write(
            &session_path,
            r#"{ "email": "guest@example.com", "application": { "has_applied": true, "status": "approved" } }"#,
        )?;

        let assert = Command::cargo_bin("garden")?
            .arg("access")
            .arg("--session")
            .arg(&session_path)
            .args(["--path", "/admin"])
            .assert()
            .success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(stdout.contains("View: member"));
        assert!(stdout.contains("Route /admin: not available"));
        Ok(())
    }

    #[test]
    fn validate_command_flags_missing_answers() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = TempDir::new()?;
        let spec_path = workspace.path().join("form.json");
        let answers_path = workspace.path().join("answers.json");
        fs::write(&spec_path, FORM)?;
        fs::write(&answers_path, r#"{ "1": { "kind": "text", "value": "Ada" } }"#)?;

        let assert = Command::cargo_bin("garden")?
            .arg("validate")
            .arg("--spec")
            .arg(&spec_path)
            .arg("--answers")
            .arg(&answers_path)
            .assert()
            .failure();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(stdout.contains("Missing required answers: #2, #3, #5"));
        Ok(())
    }
}

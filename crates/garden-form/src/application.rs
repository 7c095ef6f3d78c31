use tracing::{debug, info, warn};

use crate::answers::{AnswerMap, AnswerSet, AnswerValue, Meta};
use crate::error::FormError;
use crate::navigator::{Progress, SectionNavigator};
use crate::render::{RenderPayload, build_render_payload, render_field};
use crate::spec::FormSpec;
use crate::submit::{SubmissionGate, SubmitHandler, SubmitOutcome};

/// Side effects of recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnswerEffect {
    /// The consent rule moved the navigator forward.
    pub advanced: bool,
}

/// State owned by one application session: the form, where the applicant
/// is, what they answered, and whether a submission is running.
#[derive(Debug)]
pub struct ApplicationForm {
    spec: FormSpec,
    navigator: SectionNavigator,
    answers: AnswerMap,
    gate: SubmissionGate,
}

impl ApplicationForm {
    pub fn new(spec: FormSpec) -> Result<Self, FormError> {
        Self::with_answers(spec, AnswerMap::new())
    }

    /// Resumes a form with previously recorded answers.
    pub fn with_answers(spec: FormSpec, answers: AnswerMap) -> Result<Self, FormError> {
        spec.check()?;
        let navigator = SectionNavigator::new(&spec);
        debug!(
            form_id = %spec.id,
            sections = navigator.section_count(),
            questions = spec.questions.len(),
            "application form loaded"
        );
        Ok(Self {
            spec,
            navigator,
            answers,
            gate: SubmissionGate::new(),
        })
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn navigator(&self) -> &SectionNavigator {
        &self.navigator
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn progress(&self) -> Progress {
        self.navigator.progress(&self.answers)
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn advance(&mut self) {
        self.navigator.advance();
    }

    pub fn retreat(&mut self) {
        self.navigator.retreat();
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.navigator.jump_to(index)
    }

    /// Records an answer and applies the consent auto-advance rule: picking
    /// the affirmative option on the consent question advances exactly once.
    pub fn answer(
        &mut self,
        order_number: u32,
        value: AnswerValue,
    ) -> Result<AnswerEffect, FormError> {
        let question = self
            .spec
            .question(order_number)
            .ok_or(FormError::UnknownQuestion(order_number))?;
        let field = render_field(
            question,
            &self.spec.policy,
            self.spec.presentation.as_ref(),
            &self.answers,
        )?;
        let affirmative = field.is_consent()
            && value.is_choice()
            && value.as_str() == self.spec.policy.consent_affirmative;

        debug!(order_number, kind = field.kind.label(), "answer recorded");
        self.answers.set(order_number, value);

        if affirmative {
            self.navigator.advance();
        }
        Ok(AnswerEffect {
            advanced: affirmative,
        })
    }

    pub fn render(&self) -> Result<RenderPayload, FormError> {
        build_render_payload(
            &self.spec,
            &self.navigator,
            &self.answers,
            self.gate.is_in_flight(),
        )
    }

    /// Hands the full answer map to `handler`.
    ///
    /// Only runs on the last section and only when no other submission is in
    /// flight. The in-flight flag is cleared when the handler settles, also
    /// on rejection, which is returned as [`FormError::SubmitRejected`].
    pub async fn submit<H>(&self, handler: &H) -> Result<SubmitOutcome, FormError>
    where
        H: SubmitHandler + ?Sized,
    {
        if !self.navigator.is_last() {
            debug!(section = self.navigator.current_index(), "submit before last section");
            return Ok(SubmitOutcome::NotReady);
        }
        let Some(_guard) = self.gate.try_begin() else {
            debug!("submit ignored while another submission is in flight");
            return Ok(SubmitOutcome::InFlight);
        };

        info!(form_id = %self.spec.id, answers = self.answers.len(), "submitting application");
        match handler.submit(&self.answers).await {
            Ok(()) => {
                info!(form_id = %self.spec.id, "application submitted");
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(form_id = %self.spec.id, error = %err, "application submission rejected");
                Err(FormError::SubmitRejected(err))
            }
        }
    }

    pub fn answer_set(&self, meta: Option<Meta>) -> AnswerSet {
        AnswerSet {
            form_id: self.spec.id.clone(),
            spec_version: self.spec.version.clone(),
            answers: self.answers.clone(),
            meta,
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::answers::AnswerMap;
use crate::error::SubmitError;

/// Receives the completed answer map. Supplied by the caller.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, answers: &AnswerMap) -> Result<(), SubmitError>;
}

/// What a submit request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The handler ran and accepted the answers.
    Submitted,
    /// Another submission was already in flight; the handler was not called.
    InFlight,
    /// The last section is not active yet; the handler was not called.
    NotReady,
}

/// Single in-flight flag around the submit call.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    in_flight: AtomicBool,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the flag, or returns `None` if a submission already holds it.
    /// The flag is released when the guard drops, whatever the handler did.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { gate: self })
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a> {
    gate: &'a SubmissionGate,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed question definition {order_number}: {reason}")]
    MalformedQuestion { order_number: u32, reason: String },
    #[error("order number {0} is used by more than one question")]
    DuplicateOrder(u32),
    #[error("question {0} is not part of this form")]
    UnknownQuestion(u32),
    #[error("submission rejected: {0}")]
    SubmitRejected(#[source] SubmitError),
    #[error("failed to parse form definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by a [`SubmitHandler`](crate::submit::SubmitHandler).
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekError {
    #[error("week {0} is not an available week")]
    NotAvailable(NaiveDate),
    #[error("range start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

//! Error types for the question gate.

use thiserror::Error;

/// Why an answer was refused. The exchange stays pending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Selected option is not one of the question's options
    #[error("'{selected}' is not an option for {question_id} (choose one of: {options})")]
    UnknownOption {
        question_id: String,
        selected: String,
        options: String,
    },

    /// Selected option is empty
    #[error("No option selected for {question_id}")]
    EmptySelection { question_id: String },

    /// Free text sent to a question that only takes options
    #[error("{question_id} does not accept free-text answers")]
    FreeTextNotAllowed { question_id: String },

    /// Free text is blank
    #[error("Free-text answer for {question_id} is empty")]
    EmptyFreeText { question_id: String },

    /// Broadcast requested on a question that does not allow it
    #[error("{question_id} does not allow broadcasting the answer")]
    BroadcastNotAllowed { question_id: String },
}

/// Question gate errors.
#[derive(Debug, Error)]
pub enum GateError {
    /// Answer violates the question's contract
    #[error("Invalid answer: {0}")]
    Validation(#[from] ValidationError),

    /// No pending exchange with this id
    #[error("No pending question with id {question_id}")]
    NotFound { question_id: String },

    /// A question with this id is already waiting for an answer
    #[error("Question {question_id} is already pending")]
    DuplicateQuestion { question_id: String },

    /// The asker's context was cancelled
    #[error("Question {question_id} was cancelled before it was answered")]
    Cancelled { question_id: String },

    /// The asker's deadline passed
    #[error("Question {question_id} timed out waiting for an answer")]
    DeadlineExceeded { question_id: String },

    /// The gate has been shut down
    #[error("Question gate is shut down")]
    Shutdown,
}

impl GateError {
    /// Create a NotFound error
    pub fn not_found(question_id: impl Into<String>) -> Self {
        Self::NotFound {
            question_id: question_id.into(),
        }
    }

    /// True for cancellation and deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }

    /// True when asking again with a fresh context can succeed.
    ///
    /// Validation errors are retryable by the operator, not the asker, so they
    /// are excluded.
    pub fn is_retryable(&self) -> bool {
        self.is_cancellation()
    }

    /// True if this is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True if no pending exchange matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short operator-facing message for the dashboard status line.
    pub fn friendly_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { question_id } => {
                format!("{question_id} is no longer waiting for an answer")
            }
            Self::Cancelled { question_id } | Self::DeadlineExceeded { question_id } => {
                format!("{question_id} was withdrawn by the agent")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

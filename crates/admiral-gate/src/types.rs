//! Question, answer, and history records exchanged through the gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Option value that always counts as a valid "skip this question" choice.
pub const SKIP_SENTINEL: &str = "skip";

/// A question an agent needs a human to answer.
///
/// Created by the asking worker and never modified afterwards; the gate and
/// the UI only ever hold clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmiralQuestion {
    /// Unique id, echoed back by the answer
    pub id: String,
    /// Agent that is asking
    pub agent_id: String,
    /// Mission the agent is working on
    pub mission_id: String,
    /// Finer-grained context (task, step, file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    /// Question text shown to the operator
    pub text: String,
    /// Selectable options, in display order
    #[serde(default)]
    pub options: Vec<String>,
    /// Whether a free-form text answer is accepted
    #[serde(default)]
    pub allow_free_text: bool,
    /// Whether the answer may be broadcast to the rest of the fleet
    #[serde(default)]
    pub allow_broadcast: bool,
}

impl AdmiralQuestion {
    /// Start building a question with an explicit id.
    pub fn builder(id: impl Into<String>, text: impl Into<String>) -> QuestionBuilder {
        QuestionBuilder {
            question: AdmiralQuestion {
                id: id.into(),
                agent_id: String::new(),
                mission_id: String::new(),
                context_id: None,
                text: text.into(),
                options: Vec::new(),
                allow_free_text: false,
                allow_broadcast: false,
            },
        }
    }

    /// Start building a question with a freshly generated id.
    pub fn with_generated_id(text: impl Into<String>) -> QuestionBuilder {
        Self::builder(Self::generate_id(), text)
    }

    /// Generate a unique question id (`Q-<uuid>`).
    pub fn generate_id() -> String {
        format!("Q-{}", uuid::Uuid::new_v4().simple())
    }

    /// Look up a declared option ignoring case and surrounding whitespace.
    pub fn find_option(&self, candidate: &str) -> Option<&str> {
        let candidate = candidate.trim();
        self.options
            .iter()
            .map(String::as_str)
            .find(|option| option.trim().eq_ignore_ascii_case(candidate))
    }
}

/// Builder for [`AdmiralQuestion`].
#[derive(Debug, Clone)]
pub struct QuestionBuilder {
    question: AdmiralQuestion,
}

impl QuestionBuilder {
    /// Set the asking agent.
    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.question.agent_id = agent_id.into();
        self
    }

    /// Set the mission.
    pub fn mission(mut self, mission_id: impl Into<String>) -> Self {
        self.question.mission_id = mission_id.into();
        self
    }

    /// Set the context id.
    pub fn context(mut self, context_id: impl Into<String>) -> Self {
        self.question.context_id = Some(context_id.into());
        self
    }

    /// Set the selectable options.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.question.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Accept free-text answers.
    pub fn allow_free_text(mut self, allow: bool) -> Self {
        self.question.allow_free_text = allow;
        self
    }

    /// Allow the answer to be broadcast.
    pub fn allow_broadcast(mut self, allow: bool) -> Self {
        self.question.allow_broadcast = allow;
        self
    }

    /// Finish the question.
    pub fn build(self) -> AdmiralQuestion {
        self.question
    }
}

/// The shape of an operator's response. Exactly one applies per answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerResponse {
    /// One of the question's options
    Selected(String),
    /// Free-form text
    FreeText(String),
    /// Operator declined to decide
    Skip,
}

/// An operator's answer to a pending question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmiralAnswer {
    /// Id of the question being answered
    pub question_id: String,
    /// The response
    pub response: AnswerResponse,
    /// Broadcast the answer to the rest of the fleet
    #[serde(default)]
    pub broadcast: bool,
}

impl AdmiralAnswer {
    /// Answer with a selected option.
    pub fn selected(question_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            response: AnswerResponse::Selected(option.into()),
            broadcast: false,
        }
    }

    /// Answer with free-form text.
    pub fn free_text(question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            response: AnswerResponse::FreeText(text.into()),
            broadcast: false,
        }
    }

    /// Skip the question.
    pub fn skip(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            response: AnswerResponse::Skip,
            broadcast: false,
        }
    }

    /// Set the broadcast flag.
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// True for an explicit skip or the `skip` sentinel option.
    pub fn is_skip(&self) -> bool {
        match &self.response {
            AnswerResponse::Skip => true,
            AnswerResponse::Selected(option) => option.trim().eq_ignore_ascii_case(SKIP_SENTINEL),
            AnswerResponse::FreeText(_) => false,
        }
    }

    /// One-line summary for logs and the message center.
    pub fn summary(&self) -> String {
        let body = match &self.response {
            _ if self.is_skip() => "skipped".to_string(),
            AnswerResponse::Selected(option) => format!("selected {option}"),
            AnswerResponse::FreeText(text) => format!("replied \"{text}\""),
            AnswerResponse::Skip => "skipped".to_string(),
        };
        if self.broadcast {
            format!("{body} (broadcast)")
        } else {
            body
        }
    }
}

/// A completed exchange in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The question as asked
    pub question: AdmiralQuestion,
    /// The accepted answer
    pub answer: AdmiralAnswer,
    /// When the agent asked
    pub asked_at: DateTime<Utc>,
    /// When the answer was accepted
    pub answered_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Time between asking and answering.
    pub fn wait_time(&self) -> chrono::Duration {
        self.answered_at - self.asked_at
    }
}

//! Answer composition for the question overlay.
//!
//! [`QuestionModal`] holds what the operator has chosen so far for one
//! question: the highlighted option, the broadcast toggle, and a free-text
//! draft. It outlives the overlay, so deferring a question with `esc` or
//! being re-prompted after a rejected answer keeps the operator's input.

use admiral_gate::{AdmiralAnswer, AdmiralQuestion};

use crate::event::ShellKey;

/// Result of feeding a key to the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModalOutcome {
    /// Not a modal key; fall through to global dispatch
    Ignored,
    /// Consumed, state may have changed
    Handled,
    /// Consumed, with a notice for the status line
    Notice(String),
    /// The operator committed an answer
    Submit(AdmiralAnswer),
}

/// Operator input for one pending question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionModal {
    question_id: String,
    highlighted: usize,
    broadcast: bool,
    editing: bool,
    draft: String,
    error: Option<String>,
}

impl QuestionModal {
    /// Fresh modal state for a question.
    pub fn new(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            highlighted: 0,
            broadcast: false,
            editing: false,
            draft: String::new(),
            error: None,
        }
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    /// Index of the highlighted option.
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_broadcast(&self) -> bool {
        self.broadcast
    }

    /// Whether keys are editing the free-text draft.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Why the last answer was refused, if it was.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_error(&mut self, reason: impl Into<String>) {
        self.error = Some(reason.into());
    }

    pub(crate) fn handle_key(&mut self, question: &AdmiralQuestion, key: ShellKey) -> ModalOutcome {
        if self.editing {
            return self.handle_editing_key(key);
        }

        let option_count = question.options.len();
        match key {
            ShellKey::Up | ShellKey::Char('k') => {
                self.move_highlight(option_count, false);
                ModalOutcome::Handled
            }
            ShellKey::Down | ShellKey::Char('j') => {
                self.move_highlight(option_count, true);
                ModalOutcome::Handled
            }
            ShellKey::Char(digit @ '1'..='9') => {
                let index = (digit as usize) - ('1' as usize);
                match question.options.get(index) {
                    Some(option) => {
                        self.highlighted = index;
                        ModalOutcome::Submit(self.finish(AdmiralAnswer::selected(
                            &self.question_id,
                            option.as_str(),
                        )))
                    }
                    None => ModalOutcome::Notice(format!("There is no option {digit}")),
                }
            }
            ShellKey::Char('s') => {
                ModalOutcome::Submit(self.finish(AdmiralAnswer::skip(&self.question_id)))
            }
            ShellKey::Char('b') => {
                if question.allow_broadcast {
                    self.broadcast = !self.broadcast;
                    ModalOutcome::Handled
                } else {
                    ModalOutcome::Notice("This answer cannot be broadcast".to_string())
                }
            }
            ShellKey::Char('i') => self.start_editing(question),
            ShellKey::Enter => {
                let highlighted = self.highlighted.min(option_count.saturating_sub(1));
                if let Some(option) = question.options.get(highlighted) {
                    ModalOutcome::Submit(self.finish(AdmiralAnswer::selected(
                        &self.question_id,
                        option.as_str(),
                    )))
                } else if question.allow_free_text {
                    self.start_editing(question)
                } else {
                    ModalOutcome::Notice("No options to choose from; press s to skip".to_string())
                }
            }
            _ => ModalOutcome::Ignored,
        }
    }

    fn handle_editing_key(&mut self, key: ShellKey) -> ModalOutcome {
        match key {
            ShellKey::Char(c) => {
                self.draft.push(c);
                ModalOutcome::Handled
            }
            ShellKey::Backspace => {
                self.draft.pop();
                ModalOutcome::Handled
            }
            ShellKey::Enter => ModalOutcome::Submit(
                self.finish(AdmiralAnswer::free_text(&self.question_id, self.draft.trim())),
            ),
            ShellKey::Esc => {
                self.editing = false;
                ModalOutcome::Handled
            }
            _ => ModalOutcome::Ignored,
        }
    }

    fn start_editing(&mut self, question: &AdmiralQuestion) -> ModalOutcome {
        if question.allow_free_text {
            self.editing = true;
            ModalOutcome::Handled
        } else {
            ModalOutcome::Notice("This question only takes one of its options".to_string())
        }
    }

    fn move_highlight(&mut self, option_count: usize, forward: bool) {
        if option_count == 0 {
            return;
        }
        let current = self.highlighted.min(option_count - 1);
        self.highlighted = if forward {
            (current + 1) % option_count
        } else {
            (current + option_count - 1) % option_count
        };
    }

    fn finish(&mut self, answer: AdmiralAnswer) -> AdmiralAnswer {
        self.error = None;
        answer.with_broadcast(self.broadcast)
    }

    /// Formatted overlay body for this question.
    pub fn render(&self, question: &AdmiralQuestion) -> String {
        let mut lines = Vec::new();

        let mut origin = format!("{} · mission {}", question.agent_id, question.mission_id);
        if let Some(context) = &question.context_id {
            origin.push_str(&format!(" · {context}"));
        }
        lines.push(origin);
        lines.push(String::new());
        lines.push(question.text.clone());
        lines.push(String::new());

        for (i, option) in question.options.iter().enumerate() {
            let marker = if i == self.highlighted && !self.editing { ">" } else { " " };
            lines.push(format!(" {marker} {}. {option}", i + 1));
        }

        if question.allow_free_text {
            if self.editing {
                lines.push(format!(" > {}_", self.draft));
            } else if !self.draft.is_empty() {
                lines.push(format!("   draft: {}", self.draft));
            }
        }

        if question.allow_broadcast {
            let state = if self.broadcast { "on" } else { "off" };
            lines.push(format!("   broadcast: {state}"));
        }

        if let Some(error) = &self.error {
            lines.push(String::new());
            lines.push(format!("! {error}"));
        }

        lines.push(String::new());
        lines.push(if self.editing {
            "enter send · esc stop typing".to_string()
        } else {
            let mut hints = vec!["enter answer", "s skip"];
            if question.allow_free_text {
                hints.push("i type");
            }
            if question.allow_broadcast {
                hints.push("b broadcast");
            }
            hints.push("esc later");
            hints.join(" · ")
        });

        lines.join("\n")
    }
}

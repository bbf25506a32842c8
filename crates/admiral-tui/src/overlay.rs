//! Modal overlays drawn above the current view.

/// Help overlay kind.
pub const HELP: &str = "help";
/// Quit confirmation overlay kind.
pub const CONFIRM_QUIT: &str = "confirm_quit";
/// Agent question overlay kind. The payload is the question id.
pub const QUESTION: &str = "question";

/// Key reference shown by the help overlay.
pub const HELP_TEXT: &str = "\
ADMIRAL Key Reference

Navigation:
  Enter      Open / acknowledge
  Esc        Close overlay / back
  Tab        Next panel
  Shift+Tab  Previous panel

Agent questions:
  a          Open the next pending question
  ↑ k / ↓ j  Move between options
  1-9        Answer with that option
  Enter      Answer with the highlighted option
  i          Type a free-text answer
  b          Toggle broadcast
  s          Skip
  Esc        Answer later

General:
  ?          Show this help
  q  Ctrl+C  Quit";

/// A modal layer: a kind plus an optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    kind: String,
    payload: Option<String>,
}

impl Overlay {
    /// Create an overlay of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// The help overlay.
    pub fn help() -> Self {
        Self::new(HELP)
    }

    /// The quit confirmation overlay.
    pub fn confirm_quit() -> Self {
        Self::new(CONFIRM_QUIT)
    }

    /// An overlay showing the question with this id.
    pub fn question(question_id: impl Into<String>) -> Self {
        Self::new(QUESTION).with_payload(question_id)
    }

    /// Overlay kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Overlay payload.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Whether this overlay is of `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Title for the overlay frame.
    pub fn title(&self) -> String {
        match self.kind.as_str() {
            HELP => "Help".to_string(),
            CONFIRM_QUIT => "Quit".to_string(),
            QUESTION => format!("Question {}", self.payload.as_deref().unwrap_or("")),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Overlay::help().is(HELP));
        assert!(Overlay::confirm_quit().is(CONFIRM_QUIT));

        let question = Overlay::question("Q-1");
        assert!(question.is(QUESTION));
        assert_eq!(question.payload(), Some("Q-1"));
        assert_eq!(question.title(), "Question Q-1");
    }

    #[test]
    fn test_custom_kind_title() {
        let overlay = Overlay::new("notice").with_payload("agent-7 finished");
        assert_eq!(overlay.kind(), "notice");
        assert_eq!(overlay.title(), "notice");
    }
}

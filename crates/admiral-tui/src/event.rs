//! Event handling for the ADMIRAL TUI.
//!
//! Terminal input is translated into [`ShellEvent`]s, the only input the
//! [`AppShell`](crate::AppShell) understands. The shell answers with an
//! optional [`ShellAction`] for the driver to carry out.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use admiral_gate::{AdmiralAnswer, AdmiralQuestion};

/// Keys the shell reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKey {
    Tab,
    BackTab,
    Enter,
    Esc,
    Backspace,
    Up,
    Down,
    Char(char),
}

/// Input and lifecycle events consumed by the shell, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A key press
    Key(ShellKey),
    /// Ctrl+C or a termination request
    Interrupt,
    /// Terminal resized
    Resize { width: u16, height: u16 },
    /// An agent asked a question
    QuestionPending(AdmiralQuestion),
    /// The gate accepted the answer to this question
    AnswerAccepted { question_id: String },
    /// The gate refused the answer; the operator must answer again
    AnswerRejected { question_id: String, reason: String },
    /// The asking agent gave up on this question
    QuestionRetracted { question_id: String },
}

impl ShellEvent {
    /// Shorthand for a character key event.
    pub fn char(c: char) -> Self {
        ShellEvent::Key(ShellKey::Char(c))
    }
}

/// Requests from the shell to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// The operator confirmed quitting
    Quit,
    /// The operator answered a question
    SubmitAnswer(AdmiralAnswer),
}

/// Translate a terminal event.
pub fn translate_event(event: &Event) -> Option<ShellEvent> {
    match event {
        Event::Key(key) => translate_key(*key),
        Event::Resize(width, height) => Some(ShellEvent::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

/// Translate a key press.
pub fn translate_key(key: KeyEvent) -> Option<ShellEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Ctrl+C always interrupts; other chords are not bound
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(ShellEvent::Interrupt),
            _ => None,
        };
    }

    let key = match key.code {
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => ShellKey::BackTab,
        KeyCode::Tab => ShellKey::Tab,
        KeyCode::BackTab => ShellKey::BackTab,
        KeyCode::Enter => ShellKey::Enter,
        KeyCode::Esc => ShellKey::Esc,
        KeyCode::Backspace => ShellKey::Backspace,
        KeyCode::Up => ShellKey::Up,
        KeyCode::Down => ShellKey::Down,
        KeyCode::Char(c) => ShellKey::Char(c),
        _ => return None,
    };
    Some(ShellEvent::Key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        assert_eq!(
            translate_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ShellEvent::Interrupt)
        );
        assert_eq!(
            translate_key(key_event_with_mods(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_tab_cycling() {
        assert_eq!(
            translate_key(key_event(KeyCode::Tab)),
            Some(ShellEvent::Key(ShellKey::Tab))
        );
        assert_eq!(
            translate_key(key_event_with_mods(KeyCode::Tab, KeyModifiers::SHIFT)),
            Some(ShellEvent::Key(ShellKey::BackTab))
        );
        assert_eq!(
            translate_key(key_event_with_mods(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(ShellEvent::Key(ShellKey::BackTab))
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            translate_key(key_event(KeyCode::Enter)),
            Some(ShellEvent::Key(ShellKey::Enter))
        );
        assert_eq!(translate_key(key_event(KeyCode::Esc)), Some(ShellEvent::Key(ShellKey::Esc)));
        assert_eq!(translate_key(key_event(KeyCode::Char('?'))), Some(ShellEvent::char('?')));
        assert_eq!(
            translate_key(key_event_with_mods(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(ShellEvent::char('Q'))
        );
        assert_eq!(translate_key(key_event(KeyCode::F(5))), None);
    }

    #[test]
    fn test_release_ignored() {
        let mut key = key_event(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(translate_key(key), None);
    }

    #[test]
    fn test_resize_event() {
        assert_eq!(
            translate_event(&Event::Resize(119, 40)),
            Some(ShellEvent::Resize { width: 119, height: 40 })
        );
        assert_eq!(translate_event(&Event::FocusGained), None);
    }
}

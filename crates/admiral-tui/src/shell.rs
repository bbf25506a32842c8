//! The ADMIRAL application shell.
//!
//! [`AppShell`] owns everything the render loop needs to decide what is on
//! screen: the navigation stack, the overlay stack, per-view panel focus,
//! the layout mode, and the queue of agent questions awaiting the operator.
//! It has a single owner and is mutated only through [`AppShell::update`]
//! and its other methods; the rendering layer reads it through accessors.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info};

use admiral_core::config::DEFAULT_COMPACT_BELOW;
use admiral_gate::AdmiralQuestion;

use crate::event::{ShellAction, ShellEvent, ShellKey};
use crate::modal::{ModalOutcome, QuestionModal};
use crate::overlay::{self, HELP_TEXT, Overlay};
use crate::view::{LayoutMode, ViewDefinition};

/// Maximum navigation depth, root included.
pub const MAX_NAV_DEPTH: usize = 3;

/// Navigation, overlay, focus and question state for the dashboard.
pub struct AppShell {
    nav: Vec<String>,
    overlays: Vec<Overlay>,
    views: HashMap<String, ViewDefinition>,
    focus: HashMap<String, usize>,
    width: u16,
    height: u16,
    compact_below: u16,
    layout: LayoutMode,
    quitting: bool,
    questions: VecDeque<AdmiralQuestion>,
    modal: Option<QuestionModal>,
    status_message: Option<String>,
}

impl AppShell {
    /// Create a shell whose navigation stack holds only `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut focus = HashMap::new();
        focus.insert(root.clone(), 0);

        Self {
            nav: vec![root],
            overlays: Vec::new(),
            views: HashMap::new(),
            focus,
            width: 0,
            height: 0,
            compact_below: DEFAULT_COMPACT_BELOW,
            layout: LayoutMode::from_width(0, DEFAULT_COMPACT_BELOW),
            quitting: false,
            questions: VecDeque::new(),
            modal: None,
            status_message: None,
        }
    }

    /// Use a different standard/compact threshold.
    pub fn with_compact_threshold(mut self, compact_below: u16) -> Self {
        self.compact_below = compact_below.max(1);
        self.layout = LayoutMode::from_width(self.width, self.compact_below);
        self
    }

    /// Register or replace the definition for a view.
    pub fn register_view(&mut self, id: impl Into<String>, definition: ViewDefinition) {
        let id = id.into();
        if id.is_empty() {
            return;
        }
        self.views.insert(id, definition);
    }

    // ---- navigation ----

    /// Push a view. At full depth the top entry is replaced instead.
    pub fn push_view(&mut self, id: impl Into<String>) {
        let id = id.into();
        if id.is_empty() {
            return;
        }

        if self.nav.len() < MAX_NAV_DEPTH {
            self.nav.push(id.clone());
        } else if let Some(top) = self.nav.last_mut() {
            *top = id.clone();
        }
        debug!(view = %id, depth = self.nav.len(), "Pushed view");
        self.focus.entry(id).or_insert(0);
    }

    /// Pop the top view. The root is never popped.
    pub fn pop_view(&mut self) -> bool {
        if self.nav.len() <= 1 {
            return false;
        }
        let popped = self.nav.pop();
        debug!(view = ?popped, depth = self.nav.len(), "Popped view");
        true
    }

    /// Push an overlay. Overlays with an empty kind are ignored.
    pub fn push_overlay(&mut self, overlay: Overlay) {
        if overlay.kind().is_empty() {
            return;
        }
        debug!(kind = overlay.kind(), "Pushed overlay");
        self.overlays.push(overlay);
    }

    /// Pop the top overlay.
    pub fn pop_overlay(&mut self) -> bool {
        self.overlays.pop().is_some()
    }

    /// Move focus to the next (or previous) panel of the current view.
    pub fn cycle_panel_focus(&mut self, forward: bool) {
        let view = self.current_view().to_string();
        let count = self.views.get(&view).map_or(0, |def| def.panels().len());
        if count == 0 {
            return;
        }

        let index = self.focus.entry(view).or_insert(0);
        let current = (*index).min(count - 1);
        *index = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
    }

    /// Record the terminal size and recompute the layout mode.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let layout = LayoutMode::from_width(width, self.compact_below);
        if layout != self.layout {
            debug!(width, layout = %layout, "Layout mode changed");
        }
        self.layout = layout;
    }

    // ---- event dispatch ----

    /// Apply one event. Returns the action the driver must carry out, if any.
    pub fn update(&mut self, event: ShellEvent) -> Option<ShellAction> {
        if self.quitting {
            return None;
        }

        match event {
            ShellEvent::Key(key) => self.handle_key(key),
            ShellEvent::Interrupt => {
                self.request_quit();
                None
            }
            ShellEvent::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            ShellEvent::QuestionPending(question) => {
                self.enqueue_question(question);
                None
            }
            ShellEvent::AnswerAccepted { question_id } => {
                self.answer_accepted(&question_id);
                None
            }
            ShellEvent::AnswerRejected { question_id, reason } => {
                self.answer_rejected(&question_id, reason);
                None
            }
            ShellEvent::QuestionRetracted { question_id } => {
                self.question_retracted(&question_id);
                None
            }
        }
    }

    fn handle_key(&mut self, key: ShellKey) -> Option<ShellAction> {
        match self.route_to_modal(key) {
            ModalOutcome::Ignored => {}
            ModalOutcome::Handled => return None,
            ModalOutcome::Notice(message) => {
                self.status_message = Some(message);
                return None;
            }
            ModalOutcome::Submit(answer) => {
                // Leaves the question queued until the gate's verdict arrives
                self.pop_overlay();
                self.settle_overlays();
                self.status_message = Some(format!("Sending answer to {}", answer.question_id));
                return Some(ShellAction::SubmitAnswer(answer));
            }
        }

        match key {
            ShellKey::Tab => self.cycle_panel_focus(true),
            ShellKey::BackTab => self.cycle_panel_focus(false),
            ShellKey::Char('?') => {
                if !self.top_is(overlay::HELP) {
                    self.push_overlay(Overlay::help());
                }
            }
            ShellKey::Char('q') | ShellKey::Char('Q') => self.request_quit(),
            ShellKey::Char('a') => {
                if self.questions.is_empty() {
                    self.status_message = Some("No questions waiting".to_string());
                } else if !self.open_front_question() {
                    self.status_message = Some("The next question is already open".to_string());
                }
            }
            ShellKey::Esc => {
                if self.pop_overlay() {
                    self.settle_overlays();
                } else {
                    self.pop_view();
                }
            }
            ShellKey::Enter => return self.handle_enter(),
            _ => {}
        }
        None
    }

    fn handle_enter(&mut self) -> Option<ShellAction> {
        match self.overlays.last() {
            Some(top) if top.is(overlay::CONFIRM_QUIT) => {
                self.pop_overlay();
                self.quitting = true;
                info!("Operator confirmed quit");
                Some(ShellAction::Quit)
            }
            Some(_) => {
                self.pop_overlay();
                self.settle_overlays();
                None
            }
            None => {
                let target = self
                    .views
                    .get(self.current_view())
                    .and_then(|def| def.target())
                    .map(str::to_string);
                if let Some(target) = target {
                    self.push_view(target);
                }
                None
            }
        }
    }

    /// Keys go to the modal only while its question overlay is on top.
    fn route_to_modal(&mut self, key: ShellKey) -> ModalOutcome {
        let Some(question_id) = self
            .overlays
            .last()
            .filter(|top| top.is(overlay::QUESTION))
            .and_then(|top| top.payload())
        else {
            return ModalOutcome::Ignored;
        };

        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            return ModalOutcome::Ignored;
        };

        if self.modal.as_ref().is_none_or(|m| m.question_id() != question.id) {
            self.modal = Some(QuestionModal::new(question.id.clone()));
        }
        match self.modal.as_mut() {
            Some(modal) => modal.handle_key(question, key),
            None => ModalOutcome::Ignored,
        }
    }

    fn request_quit(&mut self) {
        if !self.top_is(overlay::CONFIRM_QUIT) {
            self.push_overlay(Overlay::confirm_quit());
        }
    }

    fn top_is(&self, kind: &str) -> bool {
        self.overlays.last().is_some_and(|top| top.is(kind))
    }

    /// Whether some overlay shows a question that is still queued.
    fn question_overlay_open(&self) -> bool {
        self.overlays.iter().any(|o| self.is_live_question(o))
    }

    fn is_live_question(&self, o: &Overlay) -> bool {
        o.is(overlay::QUESTION)
            && o.payload()
                .is_some_and(|id| self.questions.iter().any(|q| q.id == id))
    }

    /// Pop question overlays on top whose question is gone, then surface
    /// the next waiting question if that left none showing.
    fn settle_overlays(&mut self) {
        let mut dropped = false;
        while self
            .overlays
            .last()
            .is_some_and(|top| top.is(overlay::QUESTION) && !self.is_live_question(top))
        {
            self.pop_overlay();
            dropped = true;
        }
        if dropped && !self.question_overlay_open() {
            self.open_front_question();
        }
    }

    // ---- question queue ----

    fn enqueue_question(&mut self, question: AdmiralQuestion) {
        if self.questions.iter().any(|q| q.id == question.id) {
            debug!(question_id = %question.id, "Question already queued");
            return;
        }

        info!(
            question_id = %question.id,
            agent_id = %question.agent_id,
            "Agent question queued"
        );
        self.status_message = Some(format!("{} is asking a question", question.agent_id));
        self.questions.push_back(question);

        if !self.question_overlay_open() {
            self.open_front_question();
        }
    }

    fn open_front_question(&mut self) -> bool {
        let Some(front) = self.questions.front() else {
            return false;
        };
        let id = front.id.clone();
        self.open_question(&id)
    }

    /// Push the question's overlay. False if it is already on the stack.
    fn open_question(&mut self, question_id: &str) -> bool {
        if self
            .overlays
            .iter()
            .any(|o| o.is(overlay::QUESTION) && o.payload() == Some(question_id))
        {
            debug!(question_id, "Question overlay already open");
            return false;
        }
        if self.modal.as_ref().is_none_or(|m| m.question_id() != question_id) {
            self.modal = Some(QuestionModal::new(question_id));
        }
        self.push_overlay(Overlay::question(question_id));
        true
    }

    fn remove_question(&mut self, question_id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != question_id);
        if self.modal.as_ref().is_some_and(|m| m.question_id() == question_id) {
            self.modal = None;
        }
        self.questions.len() != before
    }

    fn answer_accepted(&mut self, question_id: &str) {
        if self.remove_question(question_id) {
            self.status_message = Some(format!("Answered {question_id}"));
        }
        self.settle_overlays();
        if !self.question_overlay_open() {
            self.open_front_question();
        }
    }

    fn answer_rejected(&mut self, question_id: &str, reason: String) {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return;
        }

        if self.modal.as_ref().is_none_or(|m| m.question_id() != question_id) {
            self.modal = Some(QuestionModal::new(question_id));
        }
        if let Some(modal) = self.modal.as_mut() {
            modal.set_error(reason.clone());
        }
        self.status_message = Some(format!("Answer to {question_id} rejected: {reason}"));
        self.open_question(question_id);
    }

    fn question_retracted(&mut self, question_id: &str) {
        if !self.remove_question(question_id) {
            return;
        }
        info!(question_id, "Question retracted by its agent");
        self.status_message = Some(format!("{question_id} was withdrawn"));

        self.settle_overlays();
        if !self.question_overlay_open() {
            self.open_front_question();
        }
    }

    // ---- rendering ----

    /// The current view's output followed by every overlay, bottom to top.
    pub fn render(&self) -> String {
        let mut out = self.render_view();
        for overlay in &self.overlays {
            out.push_str("\n\n");
            out.push_str(&format!("── {} ──\n", overlay.title()));
            out.push_str(&self.overlay_body(overlay));
        }
        out
    }

    /// The current view's output, or a placeholder naming the view.
    pub fn render_view(&self) -> String {
        let view = self.current_view();
        match self.views.get(view).and_then(|def| def.renderer()) {
            Some(render) => render(self),
            None => format!("[{view}]"),
        }
    }

    /// Formatted body of one overlay.
    pub fn overlay_body(&self, overlay: &Overlay) -> String {
        match overlay.kind() {
            overlay::HELP => HELP_TEXT.to_string(),
            overlay::CONFIRM_QUIT => {
                let mut body = String::from("Quit ADMIRAL?\n\nenter confirm · esc cancel");
                if !self.questions.is_empty() {
                    body.push_str(&format!(
                        "\n\n{} agent question(s) are still waiting",
                        self.questions.len()
                    ));
                }
                body
            }
            overlay::QUESTION => {
                let id = overlay.payload().unwrap_or_default();
                match self.questions.iter().find(|q| q.id == id) {
                    Some(question) => match &self.modal {
                        Some(modal) if modal.question_id() == id => modal.render(question),
                        _ => QuestionModal::new(id).render(question),
                    },
                    None => format!("Question {id} is no longer pending"),
                }
            }
            _ => overlay.payload().unwrap_or_default().to_string(),
        }
    }

    // ---- accessors ----

    /// Id of the view on top of the navigation stack.
    pub fn current_view(&self) -> &str {
        self.nav.last().map(String::as_str).unwrap_or_default()
    }

    pub fn nav_stack(&self) -> &[String] {
        &self.nav
    }

    pub fn top_overlay(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn view(&self, id: &str) -> Option<&ViewDefinition> {
        self.views.get(id)
    }

    /// Focused panel index of a view (0 until focus moves).
    pub fn focused_panel_index(&self, view: &str) -> usize {
        self.focus.get(view).copied().unwrap_or(0)
    }

    /// Focused panel id of a view, if it has a focus order.
    pub fn focused_panel(&self, view: &str) -> Option<&str> {
        let panels = self.views.get(view)?.panels();
        if panels.is_empty() {
            return None;
        }
        let index = self.focused_panel_index(view).min(panels.len() - 1);
        Some(panels[index].as_str())
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout
    }

    /// Last known terminal size as (width, height).
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Replace the footer status line.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Questions waiting for the operator, oldest first.
    pub fn pending_questions(&self) -> &VecDeque<AdmiralQuestion> {
        &self.questions
    }

    /// Modal state of the question being answered, if any.
    pub fn question_modal(&self) -> Option<&QuestionModal> {
        self.modal.as_ref()
    }
}

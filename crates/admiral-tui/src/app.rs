//! Terminal driver for the ADMIRAL dashboard.
//!
//! `App` owns the [`AppShell`] and the UI side of the [`QuestionGate`]. Each
//! loop iteration it moves newly asked questions into the shell, draws if
//! anything changed, and feeds translated terminal input to the shell. The
//! shell's actions are carried out here: answers go to the gate and the
//! gate's verdict goes back to the shell.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{debug, info, warn};

use admiral_core::AdmiralConfig;
use admiral_gate::{QuestionGate, QuestionStream};

use crate::dashboard;
use crate::event::{ShellAction, ShellEvent, translate_event};
use crate::overlay::{self, Overlay};
use crate::shell::AppShell;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Input poll interval when none is configured.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(50);

/// Header timestamp cache duration (update every second).
const TIMESTAMP_CACHE_DURATION: Duration = Duration::from_secs(1);

/// Main application state.
pub struct App {
    shell: AppShell,
    gate: QuestionGate,
    /// Reader side of the gate; `None` if another reader holds it
    questions: Option<QuestionStream>,
    tick_rate: Duration,
    /// Dirty flag - whether UI needs redraw
    dirty: bool,
    cached_timestamp: Option<String>,
    last_timestamp_update: Option<Instant>,
}

impl App {
    /// Dashboard app for `gate`, configured from `config`.
    pub fn new(gate: QuestionGate, config: &AdmiralConfig) -> Self {
        let shell = dashboard::dashboard_shell(&gate, config.layout.compact_below);
        Self::with_shell(shell, gate, config.ui.tick_rate())
    }

    /// App around an already configured shell.
    pub fn with_shell(shell: AppShell, gate: QuestionGate, tick_rate: Duration) -> Self {
        let questions = gate.take_questions();
        if questions.is_none() {
            warn!("Question stream already taken; agent questions will not be shown");
        }

        Self {
            shell,
            gate,
            questions,
            tick_rate,
            dirty: true,
            cached_timestamp: None,
            last_timestamp_update: None,
        }
    }

    pub fn shell(&self) -> &AppShell {
        &self.shell
    }

    pub fn gate(&self) -> &QuestionGate {
        &self.gate
    }

    /// Returns whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.shell.is_quitting()
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if UI needs redraw and clear the dirty flag.
    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn cached_timestamp(&mut self) -> String {
        let expired = self
            .last_timestamp_update
            .is_none_or(|at| at.elapsed() >= TIMESTAMP_CACHE_DURATION);
        if expired {
            self.cached_timestamp = Some(chrono::Local::now().format("%H:%M:%S").to_string());
            self.last_timestamp_update = Some(Instant::now());
        }
        self.cached_timestamp.clone().unwrap_or_default()
    }

    /// Feed one event to the shell and carry out the resulting action.
    pub fn dispatch(&mut self, event: ShellEvent) {
        if let Some(action) = self.shell.update(event) {
            self.perform(action);
        }
        self.mark_dirty();
    }

    fn perform(&mut self, action: ShellAction) {
        match action {
            ShellAction::Quit => {
                info!(
                    waiting = self.gate.pending_count(),
                    "Shutting down question gate"
                );
                self.gate.shutdown();
            }
            ShellAction::SubmitAnswer(answer) => {
                let question_id = answer.question_id.clone();
                let summary = answer.summary();

                let verdict = match self.gate.submit_answer(answer) {
                    Ok(()) => {
                        info!(question_id = %question_id, answer = %summary, "Answer delivered");
                        ShellEvent::AnswerAccepted { question_id }
                    }
                    Err(e) if e.is_validation() => {
                        warn!(question_id = %question_id, error = %e, "Answer rejected");
                        ShellEvent::AnswerRejected {
                            question_id,
                            reason: e.friendly_message(),
                        }
                    }
                    Err(e) if e.is_not_found() => {
                        debug!(question_id = %question_id, "Answered question no longer pending");
                        ShellEvent::QuestionRetracted { question_id }
                    }
                    Err(e) => {
                        warn!(question_id = %question_id, error = %e, "Answer not delivered");
                        self.shell.set_status(e.friendly_message());
                        return;
                    }
                };

                // Verdict events never produce actions
                let _ = self.shell.update(verdict);
            }
        }
    }

    /// Move new questions into the shell and drop those whose agent gave up.
    ///
    /// Returns true if the shell changed.
    pub fn poll_questions(&mut self) -> bool {
        let mut changed = false;

        if let Some(stream) = self.questions.as_mut() {
            for question in stream.drain_ready() {
                let _ = self.shell.update(ShellEvent::QuestionPending(question));
                changed = true;
            }
        }

        let withdrawn: Vec<String> = self
            .shell
            .pending_questions()
            .iter()
            .filter(|q| !self.gate.is_pending(&q.id))
            .map(|q| q.id.clone())
            .collect();
        for question_id in withdrawn {
            let _ = self.shell.update(ShellEvent::QuestionRetracted { question_id });
            changed = true;
        }

        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Run the main application loop.
    pub fn run(&mut self) -> AppResult<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        self.dispatch(ShellEvent::Resize {
            width: size.width,
            height: size.height,
        });

        let result = self.run_loop(&mut terminal);

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> AppResult<()> {
        while !self.should_quit() {
            self.poll_questions();

            let clock_due = self
                .last_timestamp_update
                .is_none_or(|at| at.elapsed() >= TIMESTAMP_CACHE_DURATION);
            if self.take_dirty() || clock_due {
                terminal.draw(|frame| self.draw(frame))?;
            }

            if event::poll(self.tick_rate)? {
                if let Some(event) = translate_event(&event::read()?) {
                    self.dispatch(event);
                }
            }
        }
        Ok(())
    }

    /// Draw the UI.
    ///
    /// The shell learns the terminal size only from resize events.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Content
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_content(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        for overlay in self.shell.overlays() {
            self.draw_overlay(frame, area, overlay);
        }
    }

    fn draw_header(&mut self, frame: &mut Frame, area: Rect) {
        let now = self.cached_timestamp();
        let title = format!(" ADMIRAL │ {} ", self.shell.nav_stack().join(" › "));

        let waiting = self.shell.pending_questions().len();
        let (status_text, status_color) = if waiting > 0 {
            (format!("[{waiting} waiting]"), Color::Yellow)
        } else {
            ("[no questions]".to_string(), Color::DarkGray)
        };
        let layout = self.shell.layout_mode().label();

        let right_len = now.len() + 2 + layout.len() + 2 + status_text.len();
        let spacing = area
            .width
            .saturating_sub(title.chars().count() as u16 + right_len as u16 + 2)
            as usize;

        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(spacing)),
            Span::styled(now, Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(layout, Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(status_text, Style::default().fg(status_color)),
        ]))
        .block(Block::default().borders(Borders::ALL));

        frame.render_widget(header, area);
    }

    fn draw_content(&self, frame: &mut Frame, area: Rect) {
        let view = self.shell.current_view();
        let content = Paragraph::new(self.shell.render_view())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(format!(" {view} "), Style::default().fg(Color::White))),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(content, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hotkey_style = Style::default().fg(Color::Cyan);
        let mut spans = vec![
            Span::styled("[enter]", hotkey_style),
            Span::raw("Open "),
            Span::styled("[esc]", hotkey_style),
            Span::raw("Back "),
            Span::styled("[tab]", hotkey_style),
            Span::raw("Panel "),
            Span::styled("[a]", hotkey_style),
            Span::raw("Questions "),
            Span::styled("[?]", hotkey_style),
            Span::raw("Help "),
            Span::styled("[q]", hotkey_style),
            Span::raw("Quit"),
        ];
        if let Some(status) = self.shell.status_message() {
            spans.push(Span::raw("  │ "));
            spans.push(Span::styled(status.to_string(), Style::default().fg(Color::Yellow)));
        }

        let footer = Paragraph::new(Line::from(spans))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::TOP));

        frame.render_widget(footer, area);
    }

    fn draw_overlay(&self, frame: &mut Frame, area: Rect, overlay: &Overlay) {
        let (width, height) = match overlay.kind() {
            overlay::CONFIRM_QUIT => (44, 9),
            overlay::QUESTION => (70, 20),
            _ => (60, 28),
        };
        let overlay_width = width.min(area.width.saturating_sub(4));
        let overlay_height = height.min(area.height.saturating_sub(2));
        let overlay_x = area.x + area.width.saturating_sub(overlay_width) / 2;
        let overlay_y = area.y + area.height.saturating_sub(overlay_height) / 2;
        let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

        frame.render_widget(Clear, overlay_area);

        let border = if overlay.is(overlay::QUESTION) {
            Color::Yellow
        } else {
            Color::Cyan
        };
        let body = Paragraph::new(self.shell.overlay_body(overlay))
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(Span::styled(
                        format!(" {} ", overlay.title()),
                        Style::default().fg(border).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(Color::Black)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(body, overlay_area);
    }
}

//! Default dashboard views.
//!
//! Fleet → mission → agent → messages, each reached with `enter` from the
//! one before. Views render as plain text; the messages view reads the
//! gate's audit trail.

use admiral_gate::{HistoryEntry, QuestionGate};

use crate::shell::AppShell;
use crate::view::{LayoutMode, ViewDefinition};

pub const FLEET: &str = "fleet";
pub const MISSION: &str = "mission";
pub const AGENT: &str = "agent";
pub const MESSAGES: &str = "messages";

/// View at the bottom of the navigation stack.
pub const ROOT_VIEW: &str = FLEET;

/// A shell rooted at the fleet view with all default views registered.
pub fn dashboard_shell(gate: &QuestionGate, compact_below: u16) -> AppShell {
    let mut shell = AppShell::new(ROOT_VIEW).with_compact_threshold(compact_below);
    install(&mut shell, gate);
    shell
}

/// Register the default views on `shell`.
pub fn install(shell: &mut AppShell, gate: &QuestionGate) {
    shell.register_view(
        FLEET,
        ViewDefinition::new()
            .focus_order(["agents", "missions", "activity"])
            .enter_target(MISSION)
            .render(|shell| {
                let mut out = view_header(shell, FLEET, "Fleet");
                let waiting = shell.pending_questions().len();
                if waiting > 0 {
                    out.push_str(&format!("\n\n{waiting} agent question(s) waiting · press a"));
                }
                out
            }),
    );

    shell.register_view(
        MISSION,
        ViewDefinition::new()
            .focus_order(["steps", "log"])
            .enter_target(AGENT)
            .render(|shell| view_header(shell, MISSION, "Mission")),
    );

    shell.register_view(
        AGENT,
        ViewDefinition::new()
            .focus_order(["transcript", "tools"])
            .enter_target(MESSAGES)
            .render(|shell| view_header(shell, AGENT, "Agent")),
    );

    let gate = gate.clone();
    shell.register_view(
        MESSAGES,
        ViewDefinition::new()
            .focus_order(["history", "pending"])
            .render(move |shell| render_messages(shell, &gate)),
    );
}

/// Title plus the view's panels, the focused one bracketed.
fn view_header(shell: &AppShell, view: &str, title: &str) -> String {
    let panels = shell.view(view).map(ViewDefinition::panels).unwrap_or_default();
    let focused = shell.focused_panel(view);

    let labels: Vec<String> = panels
        .iter()
        .map(|panel| {
            if Some(panel.as_str()) == focused {
                format!("[{panel}]")
            } else {
                format!(" {panel} ")
            }
        })
        .collect();

    let separator = match shell.layout_mode() {
        LayoutMode::Standard => " │ ",
        LayoutMode::Compact => "\n",
    };
    format!("{title}\n{}", labels.join(separator))
}

fn render_messages(shell: &AppShell, gate: &QuestionGate) -> String {
    let mut out = view_header(shell, MESSAGES, "Messages");

    let history = gate.history();
    out.push_str("\n\nAnswered:");
    if history.is_empty() {
        out.push_str("\n  (none yet)");
    }
    for entry in history.iter().rev() {
        out.push('\n');
        out.push_str(&format_history_entry(entry));
    }

    let pending = gate.pending();
    out.push_str("\n\nWaiting:");
    if pending.is_empty() {
        out.push_str("\n  (none)");
    }
    for question in &pending {
        out.push_str(&format!(
            "\n  {} {}: {}",
            question.id, question.agent_id, question.text
        ));
    }
    out
}

/// One line of the answered-questions list.
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    format!(
        "  {} {} {}: {} → {} (waited {}s)",
        entry.answered_at.format("%H:%M:%S"),
        entry.question.id,
        entry.question.agent_id,
        entry.question.text,
        entry.answer.summary(),
        entry.wait_time().num_seconds().max(0),
    )
}

//! Terminal UI for ADMIRAL.
//!
//! This crate provides the shell state machine and the Ratatui-based
//! terminal driver for the ADMIRAL dashboard.
//!
//! ## Features
//!
//! - Three-deep drill-down navigation (fleet → mission → agent)
//! - Overlay stack for help, quit confirmation and agent questions
//! - Per-view panel focus cycling
//! - Responsive standard/compact layout
//! - Answering agent questions delivered through the question gate
//!
//! ## Hotkeys
//!
//! - `Enter` - Open the selected item / acknowledge an overlay
//! - `Esc` - Close overlay / go back
//! - `Tab` / `Shift+Tab` - Cycle panel focus
//! - `a` - Open the next waiting agent question
//! - `?` - Help
//! - `q` or `Ctrl+C` - Quit (with confirmation)

pub mod app;
pub mod dashboard;
pub mod event;
pub mod modal;
pub mod overlay;
pub mod shell;
pub mod view;

pub use app::{App, AppResult};
pub use event::{ShellAction, ShellEvent, ShellKey, translate_event, translate_key};
pub use modal::QuestionModal;
pub use overlay::Overlay;
pub use shell::{AppShell, MAX_NAV_DEPTH};
pub use view::{LayoutMode, RenderFn, ViewDefinition};

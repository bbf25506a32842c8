//! # admiral-core
//!
//! Core errors, logging, and configuration for the ADMIRAL dashboard.
//!
//! This crate provides:
//! - [`AdmiralError`] - Error type for startup and terminal operations
//! - [`logging`] - Tracing setup writing JSON lines to `~/.admiral/logs/`
//! - [`config`] - YAML configuration loaded from `~/.admiral/config.yaml`
//!
//! ## Example
//!
//! ```no_run
//! use admiral_core::{AdmiralConfig, LogOptions, logging};
//!
//! fn main() -> admiral_core::Result<()> {
//!     let _guard = logging::init_logging(LogOptions::default())?;
//!     let config = AdmiralConfig::load(None)?;
//!     tracing::info!(capacity = config.gate.capacity, "config loaded");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AdmiralConfig, GateSettings, LayoutSettings, UiSettings};
pub use error::{AdmiralError, Result};
pub use logging::{LogGuard, LogOptions, init_logging};

//! ADMIRAL - Multi-agent Control Surface
//!
//! A terminal dashboard for watching fleets of coding agents and answering
//! the questions they raise while they work.
//!
//! ## Usage
//!
//! ```bash
//! # Start the dashboard
//! admiral
//!
//! # With verbose logging
//! admiral -v
//!
//! # With custom log directory and configuration
//! admiral --log-dir /path/to/logs/ --config ./admiral.yaml
//!
//! # With scripted agents asking sample questions
//! admiral --demo
//! ```

mod demo;

use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use admiral_core::{AdmiralConfig, LogGuard, LogOptions, init_logging};
use admiral_gate::{GateConfig, QuestionGate};
use admiral_tui::App;
use clap::Parser;
use tracing::{debug, error, info};

/// ADMIRAL multi-agent control surface
///
/// A terminal interface for supervising coding agents and answering
/// the questions they ask.
#[derive(Parser, Debug)]
#[command(name = "admiral")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.admiral/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.admiral/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start scripted agents that ask sample questions
    #[arg(long)]
    demo: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let config = match AdmiralConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("Hint: {}", hint);
            }
            return ExitCode::from(2);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!(demo = cli.demo, "Starting ADMIRAL dashboard");

    match run_app(&cli, &config) {
        Ok(()) => {
            info!("ADMIRAL dashboard exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("ADMIRAL dashboard error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the panic message.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    // Disable raw mode first
    let _ = crossterm::terminal::disable_raw_mode();

    crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::execute!(stdout, crossterm::cursor::Show)?;

    stdout.flush()?;

    Ok(())
}

/// Set up logging based on CLI arguments.
///
/// The TUI owns the terminal, so only the file layer is enabled.
fn setup_logging(cli: &Cli) -> admiral_core::Result<LogGuard> {
    let mut options = LogOptions::default().verbose(cli.verbose > 0);
    if let Some(dir) = &cli.log_dir {
        options = options.with_log_dir(dir);
    }
    init_logging(options)
}

fn gate_config(config: &AdmiralConfig) -> GateConfig {
    let gate = GateConfig::default().with_capacity(config.gate.capacity);
    match config.gate.question_timeout() {
        Some(timeout) => gate.with_default_timeout(timeout),
        None => gate,
    }
}

/// Run the TUI on this thread while agents run on a tokio runtime.
fn run_app(cli: &Cli, config: &AdmiralConfig) -> admiral_tui::AppResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("admiral-agents")
        .build()?;

    let gate = QuestionGate::with_config(gate_config(config));
    if cli.demo {
        runtime.spawn(demo::run(gate.clone()));
    }

    let mut app = App::new(gate.clone(), config);
    let result = app.run();

    // Unblock any agent still waiting on the operator
    gate.shutdown();

    let history = gate.history();
    info!(answered = history.len(), "Question history at exit");
    match serde_json::to_string(&history) {
        Ok(json) => debug!(history = %json, "Answered questions"),
        Err(e) => error!("Failed to serialize question history: {}", e),
    }

    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

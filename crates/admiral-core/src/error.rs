//! Error types for ADMIRAL startup and terminal operations.
//!
//! Interaction errors (answer validation, cancelled questions) live next to
//! the question gate. [`AdmiralError`] covers what can go wrong around it:
//! reading configuration, preparing log directories, and owning the terminal.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`AdmiralError`].
pub type Result<T> = std::result::Result<T, AdmiralError>;

/// Error type for ADMIRAL process-level operations.
#[derive(Debug, Error)]
pub enum AdmiralError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    /// Terminal restore failed
    #[error("Failed to restore terminal: {message}")]
    TerminalRestore { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in ADMIRAL)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AdmiralError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a terminal initialization error
    pub fn terminal_init(message: impl Into<String>) -> Self {
        Self::TerminalInit {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is fatal (should exit application)
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TerminalInit { .. } | Self::Internal { .. })
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.admiral/config.yaml or omit --config to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ConfigValidation { .. } => {
                Some("Capacity, layout threshold, and tick rate must all be greater than zero")
            }
            Self::DirectoryCreation { .. } => Some("Pass --log-dir to use a writable directory"),
            Self::TerminalInit { .. } => Some("Try running in a different terminal"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = AdmiralError::config_not_found("/home/user/.admiral/config.yaml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(!err.is_fatal());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_config_invalid_error() {
        let err = AdmiralError::config_invalid("/tmp/config.yaml", "expected a mapping");
        assert!(err.to_string().contains("/tmp/config.yaml"));
        assert!(err.to_string().contains("expected a mapping"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_classification() {
        assert!(AdmiralError::terminal_init("no tty").is_fatal());
        assert!(AdmiralError::internal("bug").is_fatal());
        assert!(!AdmiralError::config_validation("capacity").is_fatal());
    }

    #[test]
    fn test_error_guidance() {
        let err = AdmiralError::terminal_init("raw mode unavailable");
        assert_eq!(err.guidance(), Some("Try running in a different terminal"));
        assert_eq!(AdmiralError::internal("x").guidance(), None);
    }
}

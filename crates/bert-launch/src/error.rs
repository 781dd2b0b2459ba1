//! Error types for launcher operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Exit status used by shells when a command cannot be found
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Errors that can occur while preparing or running a launch
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Mode argument was neither `train` nor `test`
    #[error("Invalid mode {mode}!!!")]
    InvalidMode {
        /// Mode string as given on the command line
        mode: String,
    },

    /// Environment override could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig {
        /// Environment variable name
        key: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    /// Output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// External process could not be started
    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        /// Program that was executed
        program: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error while relaying process output
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Create an invalid mode error
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        Self::InvalidMode { mode: mode.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(key: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key,
            value: value.into(),
        }
    }

    /// Process exit status the CLI reports for this error.
    ///
    /// A missing interpreter maps to 127, matching what a shell returns for
    /// an unknown command. Everything else is a plain failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                EXIT_COMMAND_NOT_FOUND
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_message() {
        let err = LaunchError::invalid_mode("bogus");
        assert_eq!(err.to_string(), "Invalid mode bogus!!!");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_missing_program_exit_code() {
        let err = LaunchError::Spawn {
            program: PathBuf::from("python"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), EXIT_COMMAND_NOT_FOUND);
        assert!(err.to_string().starts_with("Failed to start python"));
    }

    #[test]
    fn test_spawn_permission_denied_is_plain_failure() {
        let err = LaunchError::Spawn {
            program: PathBuf::from("run.py"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), 1);
    }
}

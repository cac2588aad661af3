//! Error handling for script generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for script generation operations.
pub type ArrayResult<T> = Result<T, ArrayError>;

/// Errors that can occur while turning a command list into a PBS array script.
///
/// Every variant is terminal: the run aborts and no output file is left behind.
#[derive(Error, Debug)]
pub enum ArrayError {
    /// Wrong command-line shape (missing or extra arguments).
    #[error("Usage error: {0}")]
    Usage(String),

    /// A batch size that is not a positive integer.
    #[error("Invalid commands per node '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    /// The command file does not exist.
    #[error("Command file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reading the command file or writing the script failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The command file holds no usable command.
    #[error("Command file contains no commands: {}", .0.display())]
    EmptyInput(PathBuf),

    /// A command line that would break the generated script.
    #[error(
        "Command file {} line {line} is '{command}', which ends the script's command block",
        path.display()
    )]
    ReservedCommand {
        path: PathBuf,
        line: usize,
        command: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArrayError {
    /// Wrap an IO error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArrayError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_argument(value: &str, reason: impl Into<String>) -> Self {
        ArrayError::InvalidArgument {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

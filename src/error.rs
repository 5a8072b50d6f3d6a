use std::process::ExitStatus;

use thiserror::Error;

/// Unified application error type. Every variant is fatal for the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No commit hashes found in input")]
    NoInput,
    #[error("Error running git command `{command}` ({status}). {stderr}")]
    ExternalCommand {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Unable to start `{program}`. {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Errored while handling standard input or output. {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse command output as UTF-8. {0}")]
    Utf8Parse(#[from] std::string::FromUtf8Error),
}

/// Convenience alias for results that bubble `AppError`.
pub type AppResult<T> = Result<T, AppError>;

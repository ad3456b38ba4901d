use std::io;
use std::path::PathBuf;

/// Errors produced while processing one input line.
///
/// None of these are fatal to the shell: the dispatch loop reports them and
/// moves on to the next prompt.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The input line, or a substitution result, exceeded the configured limit.
    #[error("line too long: {len} bytes (max {max})")]
    LineTooLong { len: usize, max: usize },

    /// The `<` target could not be opened for reading.
    #[error("failed to open input file: {}: {source}", path.display())]
    InputFileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The `>` target could not be created or truncated.
    #[error("failed to open output file: {}: {source}", path.display())]
    OutputFileUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The program could not be located or started.
    #[error("command not found: {command}")]
    CommandNotFound {
        command: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A redirection or background marker was used incorrectly.
    #[error("syntax error: {reason}")]
    MalformedRedirection { reason: String },

    /// A builtin failed (bad arguments, missing directory, ...).
    #[error(transparent)]
    Builtin(#[from] anyhow::Error),
}

impl ShellError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRedirection {
            reason: reason.into(),
        }
    }
}

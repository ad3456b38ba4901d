use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Object-safe trait for a builtin that is ready to run.
pub trait ExecutableCommand {
    /// Runs the command in-process, writing its output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for `name`.
    ///
    /// `tail` is the rest of the line after the command word, unsplit, so
    /// commands that take free text (`set`, `cd`) can keep it verbatim.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        tail: &str,
    ) -> Option<Box<dyn ExecutableCommand>>;
}

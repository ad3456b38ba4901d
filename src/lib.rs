//! A tiny interactive shell: variables, redirection and background jobs.
//!
//! Every input line goes through the same pipeline:
//! 1. `$name` placeholders are expanded from the session's [`VariableStore`]
//!    (see [`substitute`]).
//! 2. Builtins (`cd`, `pwd`, `set`, `unset`) run in-process.
//! 3. Anything else is split into an [`ExecutionRequest`] (redirections and
//!    the `&` background marker, see [`split`]) and started by [`launch`].
//!
//! The main entry point is [`Interpreter`], which owns the session state and
//! runs lines, scripts, or an interactive loop.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod logging;
mod parser;
mod substitute;

pub use config::{Options, ShellConfig};
pub use env::{Environment, Variable, VariableStore};
pub use error::ShellError;
pub use external::{Launch, find_command_path, launch};
pub use interpreter::{Interpreter, Outcome};
pub use parser::{ExecutionRequest, split};
pub use substitute::substitute;

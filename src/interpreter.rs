use crate::command::{CommandFactory, ExitCode};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{self, Launch};
use crate::parser;
use crate::substitute::substitute;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::io::{self, BufRead, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank line, nothing to do.
    Empty,
    /// `quit` or `exit`: the session should end.
    Exit,
    /// A builtin ran with this exit code.
    Builtin(ExitCode),
    /// An external program was launched.
    Launched(Launch),
}

impl Outcome {
    /// Shell-style status of the line.
    pub fn status(&self) -> ExitCode {
        match self {
            Outcome::Empty | Outcome::Exit => 0,
            Outcome::Builtin(code) => *code,
            Outcome::Launched(Launch::Exited(code)) => *code,
            Outcome::Launched(Launch::Background(_)) => 0,
        }
    }
}

/// A minimal interactive shell.
///
/// Each line goes through the same steps: `quit`/`exit` are checked on the
/// raw line, `$name` placeholders are expanded, builtins (`cd`, `pwd`, `set`,
/// `unset`) run in-process, and anything else is split into an
/// [`ExecutionRequest`](crate::ExecutionRequest) and launched as an external
/// program.
///
/// Example
/// ```
/// use minish::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// sh.execute_line("set who world").unwrap();
/// assert_eq!(sh.env().vars.lookup("who"), Some("world"));
/// assert_eq!(sh.execute_line("exit").unwrap(), Outcome::Exit);
/// ```
pub struct Interpreter {
    env: Environment,
    config: ShellConfig,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtin factories.
    pub fn new(config: ShellConfig, builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            config,
            builtins,
        }
    }

    /// Create an interpreter with the default builtins and the given settings.
    pub fn with_config(config: ShellConfig) -> Self {
        Self::new(config, default_builtins())
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Process one input line. Builtin output goes to the process stdout.
    pub fn execute_line(&mut self, raw: &str) -> Result<Outcome, ShellError> {
        self.execute_line_to(raw, &mut io::stdout())
    }

    fn execute_line_to(&mut self, raw: &str, stdout: &mut dyn Write) -> Result<Outcome, ShellError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(Outcome::Empty);
        }
        if line.len() > self.config.max_line {
            return Err(ShellError::LineTooLong {
                len: line.len(),
                max: self.config.max_line,
            });
        }
        if line == "quit" || line == "exit" {
            self.env.should_exit = true;
            return Ok(Outcome::Exit);
        }

        let expanded = substitute(line, &self.env.vars, self.config.max_line)?;
        let (name, tail) = match expanded.trim().split_once(char::is_whitespace) {
            Some((name, tail)) => (name, tail.trim_start()),
            None => (expanded.trim(), ""),
        };
        if name.is_empty() {
            return Ok(Outcome::Empty);
        }

        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(&self.env, name, tail) {
                let code = cmd.execute(stdout, &mut self.env)?;
                return Ok(Outcome::Builtin(code));
            }
        }

        let request = parser::split(&expanded)?;
        let launch = external::launch(&request, &self.env)?;
        Ok(Outcome::Launched(launch))
    }

    /// Run every line of `reader`, reporting errors as they happen.
    ///
    /// Stops at end of input or on `quit`/`exit`. Returns the status of the
    /// last line that ran; a failed line counts as status 1.
    pub fn run_script<R: BufRead>(&mut self, reader: R) -> io::Result<ExitCode> {
        self.run_script_to(reader, &mut io::stdout())
    }

    fn run_script_to<R: BufRead>(&mut self, reader: R, stdout: &mut dyn Write) -> io::Result<ExitCode> {
        let mut status = 0;
        for line in reader.lines() {
            match self.execute_line_to(&line?, stdout) {
                Ok(Outcome::Exit) => break,
                Ok(outcome) => status = outcome.status(),
                Err(err) => {
                    report(&err);
                    status = 1;
                }
            }
        }
        Ok(status)
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// Ctrl-C drops the current line; Ctrl-D (end of input) ends the session.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let rl_config = Config::builder().auto_add_history(false).build();
        let mut rl = DefaultEditor::with_config(rl_config)?;

        while !self.env.should_exit {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if self.config.history && !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if let Err(err) = self.execute_line(&line) {
                        report(&err);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}

/// The builtins every shell gets: `cd`, `pwd`, `set`, `unset`.
fn default_builtins() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    vec![
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Set>::default()),
        Box::new(Factory::<Unset>::default()),
    ]
}

fn report(err: &ShellError) {
    tracing::warn!(error = %err, "command failed");
    eprintln!("minish: {}", err);
}

use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "set" or "cd".
    fn name() -> &'static str;

    /// Build the command from the unsplit rest of the line.
    ///
    /// By default the tail is split on whitespace and handed to argh.
    fn from_tail(name: &str, tail: &str) -> Result<Self, EarlyExit> {
        let args: Vec<&str> = tail.split_whitespace().collect();
        Self::from_args(&[name], &args)
    }

    /// Executes the command using the provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        BuiltinCommand::execute(*self, stdout, env)
    }
}

/// Output of a failed (or `--help`) argument parse.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        tail: &str,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        Some(match T::from_tail(name, tail) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by HOME.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    /// The whole tail is the target, so directory names may contain spaces.
    fn from_tail(name: &str, tail: &str) -> Result<Self, EarlyExit> {
        let target = tail.trim();
        if target.is_empty() || target.starts_with('-') {
            let args: Vec<&str> = tail.split_whitespace().collect();
            return Self::from_args(&[name], &args);
        }
        Ok(Cd {
            target: Some(target.to_owned()),
        })
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => anyhow::bail!("cd: no target and HOME not set"),
            },
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}: No such file or directory", new_dir.display()))?;
        anyhow::ensure!(canonical.is_dir(), "cd: {}: Not a directory", new_dir.display());

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Set a shell variable, or list all variables when called without arguments.
pub struct Set {
    #[argh(positional, greedy)]
    /// variable name followed by its value; the value may contain spaces.
    pub words: Vec<String>,
}

impl BuiltinCommand for Set {
    fn name() -> &'static str {
        "set"
    }

    /// `set NAME VALUE`: the value is the rest of the line, inner spacing kept.
    fn from_tail(name: &str, tail: &str) -> Result<Self, EarlyExit> {
        match tail.trim().split_once(char::is_whitespace) {
            Some((var, value)) if !var.starts_with('-') => Ok(Set {
                words: vec![var.to_owned(), value.trim_start().to_owned()],
            }),
            _ => {
                let args: Vec<&str> = tail.split_whitespace().collect();
                Self::from_args(&[name], &args)
            }
        }
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let Some((name, value)) = self.words.split_first() else {
            for var in env.vars.iter() {
                writeln!(stdout, "{}={}", var.name, var.value)?;
            }
            return Ok(0);
        };
        anyhow::ensure!(!value.is_empty(), "set: usage: set NAME VALUE");

        let value = value.join(" ");
        tracing::debug!(name = %name, value = %value, "set variable");
        env.vars.set(name.as_str(), value);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Remove shell variables.
pub struct Unset {
    #[argh(positional)]
    /// names of the variables to remove.
    pub names: Vec<String>,
}

impl BuiltinCommand for Unset {
    fn name() -> &'static str {
        "unset"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        for name in &self.names {
            if !env.vars.unset(name) {
                tracing::debug!(name = %name, "unset of undefined variable");
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::VariableStore;
    use std::env as stdenv;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Serialises tests that change the process working directory.
    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn test_env() -> Environment {
        Environment {
            vars: VariableStore::new(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
        }
    }

    fn make_unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!("minish_test_cd_{}_{}", std::process::id(), nanos));
        fs::create_dir_all(&p).expect("failed to create temp dir");
        p
    }

    fn run(cmd: Box<dyn ExecutableCommand>, env: &mut Environment) -> (Result<ExitCode>, String) {
        let mut out = Vec::new();
        let res = cmd.execute(&mut out, env);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let mut env = test_env();
        let (res, out) = run(Box::new(Pwd {}), &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, format!("{}\n", env.current_dir.to_string_lossy()));
    }

    #[test]
    fn test_set_joins_value_words() {
        let mut env = test_env();
        let cmd = Factory::<Set>::default()
            .try_create(&env, "set", "greeting hello there")
            .unwrap();
        let (res, _) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.vars.lookup("greeting"), Some("hello there"));
    }

    #[test]
    fn test_set_without_value_is_usage_error() {
        let mut env = test_env();
        let (res, _) = run(Box::new(Set { words: vec!["x".into()] }), &mut env);

        assert!(res.is_err());
        assert_eq!(env.vars.lookup("x"), None);
    }

    #[test]
    fn test_set_keeps_value_spacing() {
        let mut env = test_env();
        let cmd = Factory::<Set>::default()
            .try_create(&env, "set", "v   a  b\tc")
            .unwrap();
        let (res, _) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.vars.lookup("v"), Some("a  b\tc"));
    }

    #[test]
    fn test_set_name_only_from_tail_is_usage_error() {
        let mut env = test_env();
        let cmd = Factory::<Set>::default().try_create(&env, "set", "x").unwrap();
        let (res, _) = run(cmd, &mut env);

        assert!(res.is_err());
        assert_eq!(env.vars.lookup("x"), None);
    }

    #[test]
    fn test_set_without_args_lists_variables() {
        let mut env = test_env();
        env.vars.set("a", "1");
        env.vars.set("b", "two words");
        let (res, out) = run(Box::new(Set { words: vec![] }), &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, "a=1\nb=two words\n");
    }

    #[test]
    fn test_unset_removes_names() {
        let mut env = test_env();
        env.vars.set("a", "1");
        env.vars.set("b", "2");
        let cmd = Factory::<Unset>::default()
            .try_create(&env, "unset", "a missing")
            .unwrap();
        let (res, _) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.vars.lookup("a"), None);
        assert_eq!(env.vars.lookup("b"), Some("2"));
    }

    #[test]
    fn test_factory_ignores_other_names() {
        let env = test_env();
        assert!(Factory::<Cd>::default().try_create(&env, "cdrom", "").is_none());
        assert!(Factory::<Pwd>::default().try_create(&env, "pwd", "").is_some());
    }

    #[test]
    fn test_help_prints_usage() {
        let mut env = test_env();
        let cmd = Factory::<Unset>::default()
            .try_create(&env, "unset", "--help")
            .unwrap();
        let (res, out) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 0);
        assert!(out.contains("Usage: unset"), "{out}");
    }

    #[test]
    fn test_bad_args_exit_nonzero() {
        let mut env = test_env();
        let cmd = Factory::<Pwd>::default()
            .try_create(&env, "pwd", "extra")
            .unwrap();
        let (res, _) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 1);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir();
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let target = Some(canonical_temp.to_string_lossy().to_string());
        let (res, _) = run(Box::new(Cd { target }), &mut env);
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        assert_eq!(fs::canonicalize(new_cwd).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir();
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();
        env.vars.set("HOME", canonical_temp.to_string_lossy().to_string());

        let (res, _) = run(Box::new(Cd { target: None }), &mut env);
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        assert_eq!(env.current_dir, canonical_temp);

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_into_directory_with_spaces() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir();
        let spaced = temp.join("my  dir");
        fs::create_dir_all(&spaced).unwrap();
        let canonical = fs::canonicalize(&spaced).unwrap();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let tail = spaced.to_string_lossy().to_string();
        let cmd = Factory::<Cd>::default().try_create(&env, "cd", &tail).unwrap();
        let (res, _) = run(cmd, &mut env);
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, canonical);

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_help_still_parsed() {
        let mut env = test_env();
        let cmd = Factory::<Cd>::default().try_create(&env, "cd", "--help").unwrap();
        let (res, out) = run(cmd, &mut env);

        assert_eq!(res.unwrap(), 0);
        assert!(out.contains("Usage: cd"), "{out}");
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let name = format!("nonexistent_dir_for_minish_test_{}", std::process::id());
        let (res, _) = run(Box::new(Cd { target: Some(name) }), &mut env);

        let err = res.unwrap_err().to_string();
        assert!(err.contains("No such file or directory"), "{err}");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, orig);
    }
}

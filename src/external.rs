use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::ExecutionRequest;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Result of a successful launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Foreground child ran to completion with this exit code.
    Exited(ExitCode),
    /// Background child was started with this pid and left running.
    Background(u32),
}

/// Run an [`ExecutionRequest`] as an external process.
///
/// Redirection files are opened before anything is spawned; if either fails,
/// no process is started. Relative file names are taken from the session's
/// current directory, the same one the child runs in. Foreground children are
/// waited for, background children are detached right after spawn. Every file
/// and process handle the shell holds is released before this returns,
/// whichever way it returns.
pub fn launch(request: &ExecutionRequest, env: &Environment) -> Result<Launch, ShellError> {
    let stdin = match &request.input_file {
        Some(path) => File::open(env.current_dir.join(path))
            .map_err(|source| ShellError::InputFileNotFound {
                path: path.clone(),
                source,
            })?
            .into(),
        None => Stdio::inherit(),
    };
    let stdout = match &request.output_file {
        Some(path) => File::create(env.current_dir.join(path))
            .map_err(|source| ShellError::OutputFileUnwritable {
                path: path.clone(),
                source,
            })?
            .into(),
        None => Stdio::inherit(),
    };

    let command = ExternalCommand::resolve(env, &request.program_line)?;
    let mut child = command.spawn(stdin, stdout, env, request.background)?;

    if request.background {
        let pid = child.id();
        tracing::info!(pid, line = %request.program_line, "started background process");
        return Ok(Launch::Background(pid));
    }

    tracing::info!(pid = child.id(), line = %request.program_line, "waiting for process");
    let status = child.wait().map_err(|source| ShellError::CommandNotFound {
        command: request.program_line.clone(),
        source: Some(source),
    })?;
    Ok(Launch::Exited(exit_code(status)))
}

/// A resolved program plus its unsplit argument tail.
struct ExternalCommand {
    line: String,
    program: PathBuf,
    args: String,
}

impl ExternalCommand {
    /// Locate the first word of `line` using the session's `PATH`.
    fn resolve(env: &Environment, line: &str) -> Result<Self, ShellError> {
        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim_start()),
            None => (line, ""),
        };
        let search_paths = env.get_var("PATH").unwrap_or_default();

        match find_command_path(OsStr::new(&search_paths), &env.current_dir, Path::new(name)) {
            Some(program) => Ok(Self {
                line: line.to_owned(),
                program: program.into_owned(),
                args: args.to_owned(),
            }),
            None => Err(ShellError::CommandNotFound {
                command: name.to_owned(),
                source: None,
            }),
        }
    }

    /// Start the child. The [`Command`] (and the redirection handles it holds)
    /// is dropped before this returns, so only the child keeps them open.
    fn spawn(
        self,
        stdin: Stdio,
        stdout: Stdio,
        env: &Environment,
        background: bool,
    ) -> Result<Child, ShellError> {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(stdin).stdout(stdout).current_dir(&env.current_dir);
        pass_args(&mut cmd, &self.args);
        if background {
            detach_console(&mut cmd);
        }

        cmd.spawn().map_err(|source| ShellError::CommandNotFound {
            command: self.line,
            source: Some(source),
        })
    }
}

#[cfg(windows)]
fn pass_args(cmd: &mut Command, args: &str) {
    use std::os::windows::process::CommandExt;
    // Windows programs parse their own command line.
    if !args.is_empty() {
        cmd.raw_arg(args);
    }
}

#[cfg(not(windows))]
fn pass_args(cmd: &mut Command, args: &str) {
    cmd.args(args.split_whitespace());
}

#[cfg(windows)]
fn detach_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn detach_console(_cmd: &mut Command) {}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// - Absolute path: returned if it exists.
/// - `./foo` (or any path on non-Unix platforms) is tried in `cwd` first.
/// - Single component: each directory of `search_paths` is tried in order.
///   Empty entries are skipped, so an empty `PATH` finds nothing.
/// - Several components (`bin/tool`): returned if it exists relative to `cwd`.
/// - Empty path: `None`.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    cwd: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    let local = cwd.join(path);
    if search_in_current_dir && local.exists() {
        return Some(Cow::Owned(local));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => local.exists().then_some(Cow::Owned(local)),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
        if cfg!(windows) && path.extension().is_none() {
            let exe = path.with_extension("exe");
            if exe.exists() {
                return Some(exe);
            }
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

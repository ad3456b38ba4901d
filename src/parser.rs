//! Extraction of redirections and the background marker from a command line.

use crate::error::ShellError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

const MARKERS: [char; 3] = ['<', '>', '&'];

/// A redirection target: optional leading blanks, then everything up to the
/// next whitespace or marker.
static TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*([^\s<>&]*)").expect("target pattern is valid"));

/// One external command invocation, ready for the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionRequest {
    /// Program and arguments, with all markers removed.
    pub program_line: String,
    /// File to use as the child's standard input.
    pub input_file: Option<PathBuf>,
    /// File to create/truncate and use as the child's standard output.
    pub output_file: Option<PathBuf>,
    /// Do not wait for the child.
    pub background: bool,
}

/// Split an (already substituted) line into an [`ExecutionRequest`].
///
/// Markers may appear anywhere in the line, in any order:
/// - `&` runs the command in background. Plain text after it is dropped,
///   redirections after it still apply.
/// - `< file` redirects standard input.
/// - `> file` redirects standard output.
///
/// Each marker may be used at most once, must be followed by a target (for
/// `<`/`>`), and something must remain to execute. Anything else is a
/// [`ShellError::MalformedRedirection`].
pub fn split(line: &str) -> Result<ExecutionRequest, ShellError> {
    let mut request = ExecutionRequest::default();
    let mut program = String::new();
    let mut rest = line;

    while let Some(pos) = rest.find(MARKERS) {
        if !request.background {
            program.push_str(&rest[..pos]);
        }
        let marker = &rest[pos..pos + 1];
        let after = &rest[pos + 1..];

        match marker {
            "&" => {
                if request.background {
                    return Err(ShellError::malformed("duplicate '&'"));
                }
                request.background = true;
                rest = after;
            }
            _ => {
                let (target, consumed) = redirect_target(after);
                if target.is_empty() {
                    return Err(ShellError::malformed(format!(
                        "missing file name after '{marker}'"
                    )));
                }
                let slot = if marker == "<" {
                    &mut request.input_file
                } else {
                    &mut request.output_file
                };
                if slot.is_some() {
                    return Err(ShellError::malformed(format!("duplicate '{marker}'")));
                }
                *slot = Some(PathBuf::from(target));
                rest = &after[consumed..];
            }
        }
    }
    if !request.background {
        program.push_str(rest);
    }

    request.program_line = program.trim().to_owned();
    if request.program_line.is_empty() {
        return Err(ShellError::malformed("missing command"));
    }

    tracing::debug!(?request, "split command line");
    Ok(request)
}

/// Returns the target token and the number of bytes it spans, blanks included.
fn redirect_target(s: &str) -> (&str, usize) {
    match TARGET.captures(s) {
        Some(caps) => {
            let target = caps.get(1).map_or("", |m| m.as_str());
            (target, caps[0].len())
        }
        None => ("", 0),
    }
}

//! `$name` substitution over a whole input line.

use crate::env::VariableStore;
use crate::error::ShellError;

/// Expand variables in `line`.
///
/// For every live variable, in store order, the first occurrence of `$name`
/// is replaced by its value. The match is a plain substring search, so `$a`
/// also matches the start of `$abc`. Later variables see the result of earlier
/// replacements. Only one occurrence per variable is replaced per call.
///
/// Placeholders with no matching variable are left untouched.
///
/// Fails with [`ShellError::LineTooLong`] when `line` or any intermediate
/// result is longer than `max_len` bytes.
pub fn substitute(line: &str, vars: &VariableStore, max_len: usize) -> Result<String, ShellError> {
    check_len(line, max_len)?;

    let mut out = line.to_owned();
    for var in vars.iter() {
        let placeholder = format!("${}", var.name);
        let Some(pos) = out.find(&placeholder) else {
            continue;
        };

        let len = out.len() - placeholder.len() + var.value.len();
        if len > max_len {
            return Err(ShellError::LineTooLong { len, max: max_len });
        }
        out.replace_range(pos..pos + placeholder.len(), &var.value);
    }

    tracing::debug!(input = line, output = %out, "substituted line");
    Ok(out)
}

fn check_len(line: &str, max_len: usize) -> Result<(), ShellError> {
    if line.len() > max_len {
        Err(ShellError::LineTooLong {
            len: line.len(),
            max: max_len,
        })
    } else {
        Ok(())
    }
}

use argh::FromArgs;
use std::path::PathBuf;

/// Default maximum length of an input line (and of its expansion), in bytes.
pub const DEFAULT_MAX_LINE: usize = 1024;

/// Default prompt shown by the interactive loop.
pub const DEFAULT_PROMPT: &str = "minish# ";

/// Session-wide settings of an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub max_line: usize,
    /// Keep rustyline history for the interactive loop.
    pub history: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_line: DEFAULT_MAX_LINE,
            history: true,
        }
    }
}

#[derive(FromArgs, Debug)]
/// A small interactive shell with variables, redirection and background jobs.
pub struct Options {
    #[argh(option)]
    /// prompt shown before each line.
    pub prompt: Option<String>,

    #[argh(option, default = "DEFAULT_MAX_LINE")]
    /// maximum length of an input line in bytes, after variable expansion.
    pub max_line: usize,

    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    pub command: Option<String>,

    #[argh(option)]
    /// run the commands in this file, one per line, then exit.
    pub script: Option<PathBuf>,

    #[argh(switch)]
    /// do not keep a history of entered lines.
    pub no_history: bool,
}

impl Options {
    pub fn config(&self) -> ShellConfig {
        ShellConfig {
            prompt: self
                .prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            max_line: self.max_line.max(1),
            history: !self.no_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        Options::from_args(&["minish"], args).unwrap()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).config(), ShellConfig::default());
    }

    #[test]
    fn test_options_override_defaults() {
        let opts = parse(&["--prompt", "> ", "--max-line", "64", "--no-history", "-c", "pwd"]);
        let config = opts.config();

        assert_eq!(config.prompt, "> ");
        assert_eq!(config.max_line, 64);
        assert!(!config.history);
        assert_eq!(opts.command.as_deref(), Some("pwd"));
    }

    #[test]
    fn test_max_line_at_least_one() {
        assert_eq!(parse(&["--max-line", "0"]).config().max_line, 1);
    }
}

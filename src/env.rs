use std::env as stdenv;
use std::path::PathBuf;

/// A single shell variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// Ordered table of shell variables.
///
/// Variables live in slots. `unset` tombstones a slot instead of shifting the
/// others, so iteration order stays stable for everything still live. A later
/// `set` of a new name may reuse a tombstoned slot.
///
/// At most one live slot exists per name.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    slots: Vec<Option<Variable>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing the live value if there is one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if let Some(var) = self.find_mut(&name) {
            var.value = value;
            return;
        }

        let var = Variable { name, value };
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(free) => *free = Some(var),
            None => self.slots.push(Some(var)),
        }
    }

    /// Remove the live entry for `name`. Returns `false` when there was none.
    pub fn unset(&mut self, name: &str) -> bool {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|v| v.name == name) {
                *slot = None;
                return true;
            }
        }
        false
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Live variables in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.slots.iter_mut().flatten().find(|v| v.name == name)
    }
}

/// Mutable, user-level state of one shell session.
///
/// - `vars`: shell variables used for `$name` substitution. They are not
///   exported to child processes.
/// - `current_dir`: the working directory for command execution.
/// - `should_exit`: set once `quit`/`exit` was seen.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: VariableStore,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Start a session in the process's current directory with no variables.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars: VariableStore::new(),
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of a variable.
    ///
    /// Looks up the shell variables first, falling back to the process
    /// environment (used for `HOME` and `PATH`).
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .lookup(key)
            .map(str::to_owned)
            .or_else(|| stdenv::var(key).ok())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

//! Structured external-command invocations

use std::fmt;
use std::path::{Path, PathBuf};

/// One external command: program, ordered arguments and the files it must
/// leave behind. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Executable name or path
    pub program: String,

    /// Arguments in order
    pub args: Vec<String>,

    /// File that receives the command's stdout, if captured
    pub stdout: Option<PathBuf>,

    /// Files that must exist once the command exits successfully
    pub outputs: Vec<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
            outputs: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Capture stdout into `path`; the file also becomes an expected output
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.outputs.push(path.clone());
        self.stdout = Some(path);
        self
    }

    /// Declare a file the command writes itself
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Short name of the program, for messages
    pub fn tool_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    /// Shell-quoted rendering that reproduces the command by hand
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", shell_quote(&stdout.to_string_lossy()))?;
        }
        Ok(())
    }
}

/// Quote a word for POSIX shells when it contains anything unusual
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./,=:+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

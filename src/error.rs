//! Script errors
//!
//! Errors never cross a command boundary: the engine logs and drops them.
//! They exist so handlers can use `?` and so the loader can report I/O trouble.

use std::fmt;

/// The kind of script error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Too few arguments for a command (silent no-op)
    Usage,
    /// The safety guard rejected a delete/move target
    Refused,
    /// A source path or option does not exist
    NotFound,
    /// IO error
    Io,
    /// Malformed script or argument
    Syntax,
    /// An external collaborator reported failure
    Collaborator,
}

/// A script error with optional command context
#[derive(Debug)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: None,
            args: Vec::new(),
        }
    }

    pub fn with_command(mut self, cmd: impl Into<String>) -> Self {
        self.command = Some(cmd.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn usage(cmd: &str, expected: &str) -> Self {
        Self::new(ErrorKind::Usage, format!("usage: {} {}", cmd, expected))
    }

    pub fn refused(path: &str) -> Self {
        Self::new(ErrorKind::Refused, format!("refusing to touch protected path {}", path))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, what)
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, msg)
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Collaborator, msg)
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref cmd) = self.command {
            if self.args.is_empty() {
                write!(f, "{}: ", cmd)?;
            } else {
                let quoted = self.args.iter().map(|a| {
                    if a.contains(' ') || a.contains('\t') || a.is_empty() {
                        format!("'{}'", a)
                    } else {
                        a.clone()
                    }
                }).collect::<Vec<_>>().join(" ");
                write!(f, "{} {}: ", cmd, quoted)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Self::new(kind, e.to_string())
    }
}

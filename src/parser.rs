//! Package script parser
//!
//! Parses INI-sectioned package scripts:
//! - `[name]` opens a new option; everything until the next header is its body
//! - blank lines and lines starting with `#` are skipped
//! - any other line is a command, split on whitespace, except that a span
//!   between single quotes stays one token (internal whitespace preserved)
//! - commands before the first header are file-level comments and are dropped

use std::path::Path;
use crate::error::ScriptError;

/// One command: `[0]` is the command name, the rest are arguments.
pub type Command = Vec<String>;

/// An ordered run of commands (an option body, or a nested chain).
pub type CommandBlock = Vec<Command>;

/// A named option and the commands it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOption {
    /// Section name, without brackets
    pub name: String,
    /// Commands in script order
    pub commands: CommandBlock,
}

/// Split one command line into tokens.
///
/// Splitting on `'` alternates between outside and inside quotes: even
/// segments are split on whitespace, odd segments are kept whole. Empty
/// segments produce nothing, so `''` yields no token.
pub fn tokenize_line(line: &str) -> Command {
    let mut tokens = Vec::new();
    for (i, part) in line.split('\'').enumerate() {
        if part.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            tokens.push(part.to_string());
        } else {
            tokens.extend(part.split_whitespace().map(str::to_string));
        }
    }
    tokens
}

/// Parse script text into options, in file order.
///
/// Duplicate section names produce separate entries; see [`find_option`].
pub fn parse_options(text: &str) -> Vec<ScriptOption> {
    let mut options = Vec::new();
    let mut current: Option<ScriptOption> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            if let Some(done) = current.take() {
                options.push(done);
            }
            current = Some(ScriptOption {
                name: line[1..line.len() - 1].to_string(),
                commands: Vec::new(),
            });
            continue;
        }

        match current.as_mut() {
            Some(option) => option.commands.push(tokenize_line(line)),
            None => log::trace!("dropping header line: {}", line),
        }
    }

    if let Some(done) = current {
        options.push(done);
    }
    options
}

/// Text of the two-option skeleton written for a missing script.
pub fn default_script(names: [&str; 2]) -> String {
    format!("[{}]\nreboot\n[{}]\nshutdown\n", names[0], names[1])
}

/// Load options from a script file.
///
/// A missing file is created first: with the reboot/shutdown skeleton when
/// `skeleton` names are given, empty otherwise. It is then parsed like any
/// other script.
pub fn load_options(path: &Path, skeleton: Option<[&str; 2]>) -> Result<Vec<ScriptOption>, ScriptError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = skeleton.map(default_script).unwrap_or_default();
        log::debug!("creating script {}", path.display());
        std::fs::write(path, content)?;
    }

    let text = std::fs::read_to_string(path)?;
    Ok(parse_options(&text))
}

/// First option with the given name.
pub fn find_option<'a>(options: &'a [ScriptOption], name: &str) -> Option<&'a ScriptOption> {
    options.iter().find(|o| o.name == name)
}

/// Strip one layer of matching `'` or `"` quotes.
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

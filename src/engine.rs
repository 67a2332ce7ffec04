//! Command interpreter
//!
//! The Engine holds configuration and collaborators. It is stateless
//! between runs; one engine can run many options.
//!
//! Commands of a block run strictly in order. Before a command runs:
//! - `try:` opens a retry chain. Once a chain has finished with the success
//!   flag still set, the next `try:` ends the block.
//! - `erista:` / `mariko:` open a platform section.
//! - inside a retry chain, nothing runs after the success flag drops.
//!
//! No error crosses a command boundary. A failing command can only affect
//! later ones through the success flag and the bound variables.

use std::io::Write;

use crate::commands::{self, Ctx, Op};
use crate::config::EngineConfig;
use crate::error::{ErrorKind, ScriptError};
use crate::host::{Host, Platform};
use crate::parser::{self, unquote, CommandBlock};
use crate::placeholder::Resolver;
use crate::state::{Session, State};

/// Label that opens a retry chain
pub const RETRY_MARKER: &str = "try:";

/// Nesting limit for `exec`
pub const MAX_EXEC_DEPTH: usize = 8;

/// Platform named by a section marker such as `Erista:`
pub fn platform_marker(name: &str) -> Option<Platform> {
    let label = name.strip_suffix(':')?;
    if label.eq_ignore_ascii_case("erista") {
        Some(Platform::Erista)
    } else if label.eq_ignore_ascii_case("mariko") {
        Some(Platform::Mariko)
    } else {
        None
    }
}

/// The script engine
pub struct Engine {
    pub config: EngineConfig,
    pub host: Host,
    /// Whether to suppress the execution transcript
    pub quiet: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, host: Host) -> Self {
        Self { config, host, quiet: false }
    }

    /// Run an option body as a top-level invocation.
    pub fn run(&self, session: &mut Session, state: &mut State, block: &CommandBlock) {
        session.refresh_requested = false;
        self.interpret(session, state, block);
    }

    /// Interpret a block. The success flag starts out set.
    pub fn interpret(&self, session: &mut Session, state: &mut State, block: &CommandBlock) {
        session.command_success = true;

        for command in block {
            let Some(name) = command.first() else {
                continue;
            };

            if name == RETRY_MARKER {
                state.retry_count += 1;
                if session.command_success && state.retry_count > 1 {
                    log::debug!("retry chain {} not needed", state.retry_count);
                    break;
                }
                session.command_success = true;
                log::info!("Try #{}", state.retry_count);
                if !self.quiet {
                    state.logf(&format!("Try #{}", state.retry_count));
                }
                continue;
            }

            if let Some(section) = platform_marker(name) {
                state.enter_platform_section(section, self.host.device.platform());
                continue;
            }

            if !state.platform_permits(self.config.strict_platform_sections) {
                log::trace!("skipping {} outside the device's platform section", name);
                continue;
            }
            if state.retry_count != 0 && !session.command_success {
                continue;
            }

            self.execute(session, state, command);
        }
    }

    fn execute(&self, session: &mut Session, state: &mut State, command: &[String]) {
        let (resolved, resolved_ok) =
            Resolver::new(&self.config, &self.host, &state.bindings).resolve_command(command);
        if !resolved_ok {
            session.command_success = false;
        }

        if !self.quiet {
            state.logf(&format!("> {}", resolved.join(" ")));
        }

        let name = resolved[0].as_str();
        let args = &resolved[1..];
        let op = Op::parse(name);

        if op == Op::Unknown {
            log::debug!("unknown command {}", name);
        } else if args.len() < op.min_args() {
            log::trace!("{}", ScriptError::usage(name, &op.usage().args));
        } else if op == Op::Exec {
            self.exec(session, state, unquote(&args[0]));
        } else {
            let mut ctx = Ctx { config: &self.config, host: &self.host, state: &mut *state, session: &mut *session };
            if let Err(e) = commands::run(op, &mut ctx, args) {
                let e = e.with_command(name).with_args(args.to_vec());
                match e.kind {
                    ErrorKind::Refused => {
                        log::info!("{}", e);
                        if !self.quiet {
                            state.logf(&format!("[refused] {}", e.message));
                        }
                    }
                    ErrorKind::Usage => log::trace!("{}", e),
                    _ => log::debug!("{}", e),
                }
            }
        }

        if state.logging {
            self.append_log(&resolved);
        }
    }

    /// Run an option of the boot script next to the running script.
    ///
    /// The nested run gets fresh bindings. A success flag that was already
    /// down before the call stays down afterwards.
    fn exec(&self, session: &mut Session, state: &mut State, option: &str) {
        if session.depth >= MAX_EXEC_DEPTH {
            log::warn!("exec {}: nesting deeper than {}", option, MAX_EXEC_DEPTH);
            return;
        }

        let script = format!("{}{}", state.script_dir, self.config.boot_script_name);
        let host_script = self.config.host_path(&script);
        if !host_script.is_file() {
            log::debug!("exec {}: no {}", option, script);
            return;
        }
        let options = match parser::load_options(&host_script, None) {
            Ok(options) => options,
            Err(e) => {
                log::debug!("exec {}: {}", option, e);
                return;
            }
        };
        let Some(found) = parser::find_option(&options, option) else {
            log::debug!("exec: no option [{}] in {}", option, script);
            return;
        };

        let outer_failed = !session.command_success;
        let mut nested = State::new(state.script_dir.clone(), found.name.clone());
        session.depth += 1;
        self.interpret(session, &mut nested, &found.commands);
        session.depth -= 1;
        state.log.push_str(&nested.log);

        if outer_failed {
            session.command_success = false;
        }
    }

    /// Append `Executing command: ...` to the configured log file.
    fn append_log(&self, command: &[String]) {
        let mut message = String::from("Executing command: ");
        for token in command {
            message.push_str(token);
            message.push(' ');
        }

        let path = self.config.host_path(&self.config.log_file);
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{}", message)
        })();
        if let Err(e) = result {
            log::debug!("log file {}: {}", path.display(), e);
        }
    }
}

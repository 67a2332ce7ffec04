//! Built-in script commands
//!
//! A command name is parsed once into an [`Op`]. Each op has a minimum
//! argument count; the engine skips a command that falls short without
//! calling its handler. Names outside the table parse to [`Op::Unknown`]
//! and do nothing.

mod file_ops;
mod hex_ops;
mod ini;
mod system;

use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::error::ScriptError;
use crate::host::Host;
use crate::state::{Binding, Session, State};

pub use hex_ops::{ascii_to_hex, decimal_to_hex, decimal_to_reversed_hex};

/// Usage information for a command
pub struct CmdUsage {
    pub summary: String,
    pub args: String,
}

/// A built-in operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Bind(Binding),
    Make,
    Copy,
    Delete,
    Move,
    MirrorCopy,
    MirrorDelete,
    AddIniSection,
    RenameIniSection,
    RemoveIniSection,
    SetIniVal,
    SetIniKey,
    SetFooter,
    HexByOffset,
    HexByCustomOffset,
    HexByCustomDecimalOffset,
    HexByCustomRDecimalOffset,
    HexBySwap,
    HexByString,
    HexByDecimal,
    HexByRDecimal,
    Download,
    Unzip,
    Exec,
    Reboot,
    Shutdown,
    Backlight,
    Refresh,
    Logging,
    Clear,
    Unknown,
}

/// Accepted command names, in listing order
const NAMES: &[(&str, Op)] = &[
    ("list", Op::Bind(Binding::List)),
    ("list_source", Op::Bind(Binding::List)),
    ("json", Op::Bind(Binding::Json)),
    ("json_source", Op::Bind(Binding::Json)),
    ("json_file", Op::Bind(Binding::JsonFile)),
    ("json_file_source", Op::Bind(Binding::JsonFile)),
    ("ini_file", Op::Bind(Binding::IniFile)),
    ("hex_file", Op::Bind(Binding::HexFile)),
    ("make", Op::Make),
    ("mkdir", Op::Make),
    ("copy", Op::Copy),
    ("cp", Op::Copy),
    ("delete", Op::Delete),
    ("del", Op::Delete),
    ("rename", Op::Move),
    ("move", Op::Move),
    ("mv", Op::Move),
    ("mirror_copy", Op::MirrorCopy),
    ("mirror-copy", Op::MirrorCopy),
    ("mirror_delete", Op::MirrorDelete),
    ("mirror-delete", Op::MirrorDelete),
    ("add-ini-section", Op::AddIniSection),
    ("rename-ini-section", Op::RenameIniSection),
    ("remove-ini-section", Op::RemoveIniSection),
    ("set-ini-val", Op::SetIniVal),
    ("set-ini-value", Op::SetIniVal),
    ("set-ini-key", Op::SetIniKey),
    ("set-footer", Op::SetFooter),
    ("hex-by-offset", Op::HexByOffset),
    ("hex-by-custom-offset", Op::HexByCustomOffset),
    ("hex-by-custom-decimal-offset", Op::HexByCustomDecimalOffset),
    ("hex-by-custom-offset-decimal", Op::HexByCustomDecimalOffset),
    ("hex-by-custom-rdecimal-offset", Op::HexByCustomRDecimalOffset),
    ("hex-by-custom-offset-rdecimal", Op::HexByCustomRDecimalOffset),
    ("hex-by-swap", Op::HexBySwap),
    ("hex-by-string", Op::HexByString),
    ("hex-by-decimal", Op::HexByDecimal),
    ("hex-by-rdecimal", Op::HexByRDecimal),
    ("download", Op::Download),
    ("unzip", Op::Unzip),
    ("exec", Op::Exec),
    ("reboot", Op::Reboot),
    ("shutdown", Op::Shutdown),
    ("backlight", Op::Backlight),
    ("refresh", Op::Refresh),
    ("logging", Op::Logging),
    ("clear", Op::Clear),
];

impl Op {
    pub fn parse(name: &str) -> Op {
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, op)| *op)
            .unwrap_or(Op::Unknown)
    }

    /// Every name that parses to this op
    pub fn names(self) -> Vec<&'static str> {
        NAMES.iter().filter(|(_, op)| *op == self).map(|(n, _)| *n).collect()
    }

    /// Arguments required after the command name
    pub fn min_args(self) -> usize {
        match self {
            Op::Bind(_) | Op::Make | Op::Delete | Op::MirrorCopy | Op::MirrorDelete => 1,
            Op::Copy | Op::Move | Op::Download | Op::Unzip => 2,
            Op::AddIniSection | Op::RemoveIniSection => 2,
            Op::RenameIniSection => 3,
            Op::SetIniVal | Op::SetIniKey => 4,
            Op::SetFooter | Op::Exec | Op::Clear => 1,
            Op::HexByOffset => 3,
            Op::HexByCustomOffset | Op::HexByCustomDecimalOffset | Op::HexByCustomRDecimalOffset => 4,
            Op::HexBySwap | Op::HexByString | Op::HexByDecimal | Op::HexByRDecimal => 3,
            Op::Reboot | Op::Shutdown | Op::Backlight | Op::Refresh | Op::Logging | Op::Unknown => 0,
        }
    }

    pub fn usage(self) -> CmdUsage {
        let (summary, args) = match self {
            Op::Bind(Binding::List) => ("Bind the list read by {list(N)}", "'a,b,c'"),
            Op::Bind(Binding::Json) => ("Bind the JSON text read by {json(...)}", "'json'"),
            Op::Bind(Binding::JsonFile) => ("Bind the JSON file read by {json_file(...)}", "path"),
            Op::Bind(Binding::IniFile) => ("Bind the ini file read by {ini_file(...)}", "path"),
            Op::Bind(Binding::HexFile) => ("Bind the binary file read by {hex_file(...)}", "path"),
            Op::Make => ("Create a directory and its parents", "dir"),
            Op::Copy => ("Copy files or directory trees", "src-pattern dst"),
            Op::Delete => ("Delete files or directory trees", "pattern"),
            Op::Move => ("Move or rename files or directories", "src-pattern dst"),
            Op::MirrorCopy => ("Copy a tree onto another root", "source-root [target-root]"),
            Op::MirrorDelete => ("Delete a tree's counterpart under another root", "source-root [target-root]"),
            Op::AddIniSection => ("Add a section to an ini file", "file section"),
            Op::RenameIniSection => ("Rename an ini section", "file section new-section"),
            Op::RemoveIniSection => ("Remove an ini section", "file section"),
            Op::SetIniVal => ("Set an ini value", "file section key value..."),
            Op::SetIniKey => ("Rename an ini key", "file section key new-key..."),
            Op::SetFooter => ("Set the footer shown for this option", "value"),
            Op::HexByOffset => ("Patch bytes at an offset", "file offset hex"),
            Op::HexByCustomOffset => ("Patch bytes relative to a pattern", "file pattern offset hex"),
            Op::HexByCustomDecimalOffset => ("Patch a decimal relative to a pattern", "file pattern offset decimal"),
            Op::HexByCustomRDecimalOffset => ("Patch a little-endian decimal relative to a pattern", "file pattern offset decimal"),
            Op::HexBySwap => ("Replace hex data", "file find replace [occurrence]"),
            Op::HexByString => ("Replace ASCII text", "file find replace [occurrence]"),
            Op::HexByDecimal => ("Replace a decimal value", "file find replace [occurrence]"),
            Op::HexByRDecimal => ("Replace a little-endian decimal value", "file find replace [occurrence]"),
            Op::Download => ("Download a file", "url dest"),
            Op::Unzip => ("Extract an archive", "archive dest"),
            Op::Exec => ("Run an option of the boot script", "option"),
            Op::Reboot => ("Reboot, optionally into a boot target", "[boot|ini index-or-name | UMS | HEKATE | payload]"),
            Op::Shutdown => ("Power off", ""),
            Op::Backlight => ("Toggle the backlight", ""),
            Op::Refresh => ("Request a UI refresh", ""),
            Op::Logging => ("Toggle command logging", ""),
            Op::Clear => ("Clear the command log", "log"),
            Op::Unknown => ("Unknown command", ""),
        };
        CmdUsage { summary: summary.into(), args: args.into() }
    }
}

/// Every op with the names it accepts, in listing order.
pub fn command_table() -> Vec<(Op, Vec<&'static str>)> {
    let mut table: Vec<(Op, Vec<&'static str>)> = Vec::new();
    for (_, op) in NAMES {
        if !table.iter().any(|(seen, _)| seen == op) {
            table.push((*op, op.names()));
        }
    }
    table
}

/// What a command handler gets to work with
pub struct Ctx<'a> {
    pub config: &'a EngineConfig,
    pub host: &'a Host,
    pub state: &'a mut State,
    pub session: &'a mut Session,
}

impl Ctx<'_> {
    /// Normalized script path of an argument
    pub fn path_arg(&self, raw: &str) -> String {
        self.config.script_path(raw)
    }

    pub fn host_path(&self, script_path: &str) -> PathBuf {
        self.config.host_path(script_path)
    }
}

/// Run a built-in. `args` excludes the command name and meets `op.min_args()`.
///
/// `exec` needs the engine and is handled there; here it is a no-op.
pub fn run(op: Op, ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    match op {
        Op::Bind(which) => {
            let value = match which {
                Binding::Json => args[0].clone(),
                Binding::List => crate::parser::unquote(&args[0]).to_string(),
                Binding::JsonFile | Binding::IniFile | Binding::HexFile => ctx.path_arg(&args[0]),
            };
            if !ctx.state.bindings.bind(which, value) {
                log::trace!("{:?} already bound", which);
            }
            Ok(())
        }
        Op::Make => file_ops::make(ctx, args),
        Op::Copy => file_ops::copy(ctx, args),
        Op::Delete => file_ops::delete(ctx, args),
        Op::Move => file_ops::move_(ctx, args),
        Op::MirrorCopy => file_ops::mirror_copy(ctx, args),
        Op::MirrorDelete => file_ops::mirror_delete(ctx, args),
        Op::AddIniSection => ini::add_section(ctx, args),
        Op::RenameIniSection => ini::rename_section(ctx, args),
        Op::RemoveIniSection => ini::remove_section(ctx, args),
        Op::SetIniVal => ini::set_value(ctx, args),
        Op::SetIniKey => ini::set_key(ctx, args),
        Op::SetFooter => ini::set_footer(ctx, args),
        Op::HexByOffset => hex_ops::by_offset(ctx, args),
        Op::HexByCustomOffset => hex_ops::by_custom_offset(ctx, args, hex_ops::Encoding::Raw),
        Op::HexByCustomDecimalOffset => hex_ops::by_custom_offset(ctx, args, hex_ops::Encoding::Decimal),
        Op::HexByCustomRDecimalOffset => hex_ops::by_custom_offset(ctx, args, hex_ops::Encoding::ReversedDecimal),
        Op::HexBySwap => hex_ops::find_replace(ctx, args, hex_ops::Encoding::Raw),
        Op::HexByString => hex_ops::find_replace(ctx, args, hex_ops::Encoding::Ascii),
        Op::HexByDecimal => hex_ops::find_replace(ctx, args, hex_ops::Encoding::Decimal),
        Op::HexByRDecimal => hex_ops::find_replace(ctx, args, hex_ops::Encoding::ReversedDecimal),
        Op::Download => system::download(ctx, args),
        Op::Unzip => system::unzip(ctx, args),
        Op::Reboot => system::reboot(ctx, args),
        Op::Shutdown => system::shutdown(ctx),
        Op::Backlight => system::backlight(ctx),
        Op::Refresh => {
            ctx.session.refresh_requested = true;
            Ok(())
        }
        Op::Logging => {
            ctx.state.logging = !ctx.state.logging;
            Ok(())
        }
        Op::Clear => system::clear(ctx, args),
        Op::Exec | Op::Unknown => Ok(()),
    }
}

//! packscript: an interpreter for INI-sectioned package scripts
//!
//! A package script is a list of named options. A host UI picks one and the
//! engine runs its commands, which copy, move and delete files, edit config
//! files, patch binaries and control the device.
//!
//! # Script Syntax
//!
//! ```text
//! # comment
//! [Install]
//! try:
//! download https://example.com/tool.zip sdmc:/config/tool/tool.zip
//! unzip sdmc:/config/tool/tool.zip sdmc:/config/tool/
//! copy sdmc:/config/tool/*.ovl sdmc:/switch/.overlays/
//! try:
//! copy sdmc:/config/tool/backup/ sdmc:/switch/.overlays/
//!
//! [Uninstall]
//! delete 'sdmc:/switch/.overlays/tool.ovl'
//! mariko:
//! set-ini-val sdmc:/atmosphere/config/system_settings.ini tool enabled 0
//! ```
//!
//! Tokens split on whitespace; a `'quoted span'` stays one token. Lines
//! before the first `[section]` are ignored.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `make`, `mkdir` | Create a directory |
//! | `copy`, `cp` | Copy files or trees, wildcards allowed |
//! | `delete`, `del` | Delete files or trees, guarded |
//! | `move`, `mv`, `rename` | Move files or trees, guarded |
//! | `mirror_copy`, `mirror_delete` | Replicate or remove a tree under another root |
//! | `add-ini-section`, `rename-ini-section`, `remove-ini-section` | Edit ini sections |
//! | `set-ini-val`, `set-ini-key`, `set-footer` | Edit ini values |
//! | `hex-by-*` | Patch binary files |
//! | `download`, `unzip` | Fetch and extract; failure lowers the success flag |
//! | `exec` | Run an option of `boot_package.ini` |
//! | `reboot`, `shutdown`, `backlight` | Device control |
//! | `refresh`, `logging`, `clear log` | Session flags and the command log |
//! | `list`, `json`, `json_file`, `ini_file`, `hex_file` | Bind placeholder sources |
//!
//! # Markers
//!
//! - `try:` - start a retry chain; the first chain that succeeds ends the option
//! - `erista:` / `mariko:` - start a platform section
//! - `{list(N)}`, `{json(..)}`, `{json_file(..)}`, `{ini_file(s,k)}`, `{hex_file(..)}` -
//!   placeholders resolved before a command runs

mod commands;
mod config;
mod engine;
mod error;
mod fsops;
mod guard;
mod host;
mod parser;
mod pattern;
mod placeholder;
mod runner;
mod state;

pub use commands::{command_table, ascii_to_hex, decimal_to_hex, decimal_to_reversed_hex, CmdUsage, Op};
pub use config::{EngineConfig, Volume, SD_PREFIX};
pub use engine::{platform_marker, Engine, MAX_EXEC_DEPTH, RETRY_MARKER};
pub use error::{ErrorKind, ScriptError};
pub use fsops::{copy_entry, copy_file, copy_tree, delete_tree, mirror_copy, mirror_delete, move_entry};
pub use guard::{is_dangerous_combination, PROTECTED_ROOTS, ULTRA_PROTECTED_ROOTS};
pub use host::{
    BinaryPatcher, BootConfig, BootLoader, ConfigKind, Detached, Device, Host, JsonQuery, JsonSource,
    KeyValueStore, Network, Platform, SerdeJsonQuery,
};
pub use parser::{find_option, load_options, parse_options, tokenize_line, unquote, Command, CommandBlock, ScriptOption};
pub use pattern::{expand, has_wildcard};
pub use placeholder::{expand_source_entry, list_items, Resolver};
pub use runner::{run, RunReport, ScriptRunner, ScriptRunnerBuilder};
pub use state::{Binding, Bindings, PlatformGate, Session, State};

//! Script execution state
//!
//! [`Session`] holds the flags shared by an invocation and every nested
//! `exec` below it. [`State`] is the per-invocation context: retry counter,
//! platform gate, bound variables and the logging toggle.

use crate::host::Platform;

/// Flags shared across nested invocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Health of the current retry chain
    pub command_success: bool,
    /// Set by `refresh`; read by the caller after the run
    pub refresh_requested: bool,
    /// Current `exec` nesting depth
    pub depth: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self { command_success: true, refresh_requested: false, depth: 0 }
    }
}

/// Which platform section is open, if it matches the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformGate {
    #[default]
    None,
    Erista,
    Mariko,
}

/// A set-once bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    List,
    Json,
    JsonFile,
    IniFile,
    HexFile,
}

impl Binding {
    /// Binding recorded by a command name, including the `_source` aliases.
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "list" | "list_source" => Some(Binding::List),
            "json" | "json_source" => Some(Binding::Json),
            "json_file" | "json_file_source" => Some(Binding::JsonFile),
            "ini_file" => Some(Binding::IniFile),
            "hex_file" => Some(Binding::HexFile),
            _ => None,
        }
    }
}

/// Bound variables of one invocation. The first value bound wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    list: Option<String>,
    json: Option<String>,
    json_file: Option<String>,
    ini_file: Option<String>,
    hex_file: Option<String>,
}

impl Bindings {
    fn slot_mut(&mut self, which: Binding) -> &mut Option<String> {
        match which {
            Binding::List => &mut self.list,
            Binding::Json => &mut self.json,
            Binding::JsonFile => &mut self.json_file,
            Binding::IniFile => &mut self.ini_file,
            Binding::HexFile => &mut self.hex_file,
        }
    }

    /// Bind `value` unless the variable already holds one. Returns whether it was stored.
    pub fn bind(&mut self, which: Binding, value: impl Into<String>) -> bool {
        let slot = self.slot_mut(which);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    pub fn get(&self, which: Binding) -> Option<&str> {
        match which {
            Binding::List => self.list.as_deref(),
            Binding::Json => self.json.as_deref(),
            Binding::JsonFile => self.json_file.as_deref(),
            Binding::IniFile => self.ini_file.as_deref(),
            Binding::HexFile => self.hex_file.as_deref(),
        }
    }
}

/// Mutable state for a single invocation of the interpreter
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Retry labels seen so far
    pub retry_count: usize,
    /// Whether a platform marker has been seen
    pub in_platform_section: bool,
    pub platform_gate: PlatformGate,
    pub bindings: Bindings,
    /// Script-level `logging` toggle
    pub logging: bool,
    /// Directory of the running script, as a virtual path ending in `/`
    pub script_dir: String,
    /// Name of the option being run
    pub option_name: String,
    /// Execution transcript
    pub log: String,
}

impl State {
    pub fn new(script_dir: impl Into<String>, option_name: impl Into<String>) -> Self {
        let mut script_dir = script_dir.into();
        if !script_dir.is_empty() && !script_dir.ends_with('/') {
            script_dir.push('/');
        }
        Self {
            script_dir,
            option_name: option_name.into(),
            ..Default::default()
        }
    }

    /// Open a platform section. The gate only becomes active on a matching device.
    pub fn enter_platform_section(&mut self, section: Platform, device: Platform) {
        self.in_platform_section = true;
        self.platform_gate = match section {
            Platform::Erista if device == Platform::Erista => PlatformGate::Erista,
            Platform::Mariko if device == Platform::Mariko => PlatformGate::Mariko,
            _ => PlatformGate::None,
        };
    }

    /// Whether the platform gate lets the next command run.
    ///
    /// Without `strict`, this is the historical rule, which admits every
    /// command: the two gates can never both be active.
    pub fn platform_permits(&self, strict: bool) -> bool {
        if strict {
            return !self.in_platform_section || self.platform_gate != PlatformGate::None;
        }
        let erista = self.platform_gate == PlatformGate::Erista;
        let mariko = self.platform_gate == PlatformGate::Mariko;
        erista || mariko || !(erista && mariko)
    }

    /// Write a transcript entry
    pub fn logf(&mut self, msg: &str) {
        self.log.push_str(msg);
        if !msg.ends_with('\n') {
            self.log.push('\n');
        }
    }
}

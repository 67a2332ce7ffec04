//! Script runner
//!
//! Loads a package script, selects an option and runs it on the engine,
//! reporting the flags the host UI acts on.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{EngineConfig, Volume};
use crate::engine::Engine;
use crate::error::ScriptError;
use crate::host::{Host, Platform};
use crate::parser::{self, CommandBlock, ScriptOption};
use crate::state::{Session, State};

/// Result of running one option
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Script path as addressed by the engine
    pub script: String,
    pub option: String,
    /// Success flag after the last command
    pub success: bool,
    /// Whether a `refresh` ran
    pub refresh_requested: bool,
    /// Execution transcript
    pub log: String,
    pub duration: Duration,
}

impl RunReport {
    /// Format a summary line
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} (refresh: {}, {}ms)",
            self.option,
            if self.success { "ok" } else { "failed" },
            if self.refresh_requested { "yes" } else { "no" },
            self.duration.as_millis(),
        )
    }
}

/// Directory part of a script path, including the trailing `/`
pub fn script_dir(script: &str) -> &str {
    match script.rfind('/') {
        Some(idx) => &script[..=idx],
        None => "",
    }
}

/// Runs options of one package script
pub struct ScriptRunner {
    engine: Engine,
    script: String,
    default_options: Option<[String; 2]>,
}

impl ScriptRunner {
    pub fn new(engine: Engine, script: impl Into<String>) -> Self {
        Self { engine, script: script.into(), default_options: None }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get mutable reference to the engine
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    fn host_script(&self) -> PathBuf {
        self.engine.config.host_path(&self.script)
    }

    /// Parse the script, creating it first if it does not exist.
    pub fn options(&self) -> Result<Vec<ScriptOption>, ScriptError> {
        let skeleton = self.default_options.as_ref().map(|[a, b]| [a.as_str(), b.as_str()]);
        parser::load_options(&self.host_script(), skeleton)
    }

    /// Run the first option named `name`.
    pub fn run_option(&self, name: &str) -> Result<RunReport, ScriptError> {
        let options = self.options()?;
        let option = parser::find_option(&options, name).ok_or_else(|| {
            ScriptError::not_found(format!("no option [{}] in {}", name, self.script))
        })?;
        Ok(self.run_block(&option.name, &option.commands))
    }

    /// Run a command block as if it were option `name` of this script.
    pub fn run_block(&self, name: &str, block: &CommandBlock) -> RunReport {
        let start = Instant::now();
        let mut session = Session::default();
        let mut state = State::new(script_dir(&self.script), name);

        log::debug!("running [{}] of {}", name, self.script);
        self.engine.run(&mut session, &mut state, block);

        RunReport {
            script: self.script.clone(),
            option: name.to_string(),
            success: session.command_success,
            refresh_requested: session.refresh_requested,
            log: state.log,
            duration: start.elapsed(),
        }
    }
}

/// Builder API for convenient runner construction
pub struct ScriptRunnerBuilder {
    script: String,
    config: EngineConfig,
    platform: Platform,
    host: Option<Host>,
    quiet: bool,
    default_options: Option<[String; 2]>,
}

impl ScriptRunnerBuilder {
    /// Start building a runner for a script path such as `sdmc:/switch/.packages/x/package.ini`
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            config: EngineConfig::default(),
            platform: Platform::Erista,
            host: None,
            quiet: false,
            default_options: None,
        }
    }

    /// Map the default volume onto a host directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        match self.config.volumes.iter_mut().find(|v| v.prefix == crate::config::SD_PREFIX) {
            Some(volume) => volume.root = root,
            None => self.config.volumes.push(Volume::new(crate::config::SD_PREFIX, root)),
        }
        self
    }

    /// Map another volume prefix (`usb:/`) onto a host directory
    pub fn volume(mut self, prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.config.volumes.push(Volume::new(prefix, root));
        self
    }

    /// Platform reported by the detached host
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Use custom collaborators
    pub fn host(mut self, host: Host) -> Self {
        self.host = Some(host);
        self
    }

    pub fn log_file(mut self, path: impl Into<String>) -> Self {
        self.config.log_file = path.into();
        self
    }

    pub fn strict_platform_sections(mut self, strict: bool) -> Self {
        self.config.strict_platform_sections = strict;
        self
    }

    /// Suppress the execution transcript
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Write a two-option reboot/shutdown skeleton when the script is missing
    pub fn default_options(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.default_options = Some([first.into(), second.into()]);
        self
    }

    /// Replace the whole engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build and return the runner
    pub fn build(self) -> ScriptRunner {
        let host = self.host.unwrap_or_else(|| Host::detached(self.platform));
        let mut engine = Engine::new(self.config, host);
        engine.quiet = self.quiet;
        ScriptRunner {
            engine,
            script: self.script,
            default_options: self.default_options,
        }
    }

    /// Build and run one option
    pub fn run(self, option: &str) -> Result<RunReport, ScriptError> {
        self.build().run_option(option)
    }
}

/// Convenience function: create a runner builder for a script
pub fn run(script: impl Into<String>) -> ScriptRunnerBuilder {
    ScriptRunnerBuilder::new(script)
}

//! Engine configuration
//!
//! Scripts address files through a volume prefix such as `sdmc:/`. A
//! [`Volume`] maps that prefix onto a host directory so the same script can
//! run against an SD-card image on a workstation.

use std::path::PathBuf;
use crate::parser::unquote;

/// Default volume prefix used by package scripts.
pub const SD_PREFIX: &str = "sdmc:/";

/// A virtual volume prefix and the host directory it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Prefix as written in scripts, including the trailing `:/`
    pub prefix: String,
    /// Host directory the prefix resolves to
    pub root: PathBuf,
}

impl Volume {
    pub fn new(prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self { prefix: prefix.into(), root: root.into() }
    }
}

/// Configuration shared by every invocation of the engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Volume mappings, checked in order
    pub volumes: Vec<Volume>,
    /// Log file written when a script turns `logging` on (virtual path)
    pub log_file: String,
    /// Script consulted by `exec`, next to the running script
    pub boot_script_name: String,
    /// Config file written by `set-footer`, next to the running script
    pub package_config_name: String,
    /// Target root for `mirror_copy` / `mirror_delete` when none is given
    pub mirror_default_target: String,
    /// Skip commands in a platform section that does not match the device.
    /// Off by default: the historical behavior runs them regardless.
    pub strict_platform_sections: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volumes: vec![Volume::new(SD_PREFIX, ".")],
            log_file: "sdmc:/config/ultrahand/log.txt".into(),
            boot_script_name: "boot_package.ini".into(),
            package_config_name: "config.ini".into(),
            mirror_default_target: SD_PREFIX.into(),
            strict_platform_sections: false,
        }
    }
}

impl EngineConfig {
    /// Config with `sdmc:/` mapped onto `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            volumes: vec![Volume::new(SD_PREFIX, root)],
            ..Default::default()
        }
    }

    /// Normalize a path argument as written in a script.
    ///
    /// One layer of quotes is removed, a rooted path without a volume
    /// (`/switch/x`) is placed on the default volume and runs of `/` collapse
    /// to one, so the guard and [`host_path`](Self::host_path) see the same path.
    pub fn script_path(&self, raw: &str) -> String {
        let path = unquote(raw);
        let path = match path.strip_prefix('/') {
            Some(rest) => format!("{}{}", SD_PREFIX, rest),
            None => path.to_string(),
        };
        collapse_separators(&path)
    }

    /// Map a script path onto the host filesystem.
    ///
    /// A trailing `/` survives the mapping, since move and copy treat it as
    /// "into this directory".
    pub fn host_path(&self, path: &str) -> PathBuf {
        for volume in &self.volumes {
            if let Some(rest) = path.strip_prefix(volume.prefix.as_str()) {
                // an absolute remainder would replace the root on join
                let rest = rest.trim_start_matches('/');
                if rest.is_empty() {
                    return volume.root.clone();
                }
                return volume.root.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

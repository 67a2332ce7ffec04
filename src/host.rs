//! External collaborators
//!
//! The interpreter never edits config files, patches binaries, talks to the
//! network or reboots the device itself. It calls the traits below, bundled
//! in a [`Host`]. Every path handed to a collaborator is already a host path.
//!
//! [`Host::detached`] wires a host that can answer JSON queries (via
//! `serde_json`) and declines everything else, which is what the CLI uses
//! off-device.

use std::path::Path;

/// Hardware revision of the running console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Erista,
    Mariko,
}

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Platform::Erista => "erista",
            Platform::Mariko => "mariko",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "erista" => Ok(Platform::Erista),
            "mariko" => Ok(Platform::Mariko),
            other => Err(format!("unknown platform {:?}", other)),
        }
    }
}

/// Section/key config files
pub trait KeyValueStore: Send + Sync {
    fn get(&self, path: &Path, section: &str, key: &str) -> Option<String>;
    fn set(&self, path: &Path, section: &str, key: &str, value: &str) -> bool;
    fn set_key_name(&self, path: &Path, section: &str, key: &str, new_key: &str) -> bool;
    fn add_section(&self, path: &Path, section: &str) -> bool;
    fn rename_section(&self, path: &Path, section: &str, new_section: &str) -> bool;
    fn remove_section(&self, path: &Path, section: &str) -> bool;
}

/// Binary file reads and patches. Hex data is an uppercase hex string.
pub trait BinaryPatcher: Send + Sync {
    /// Value addressed by the `{hex_file(...)}` arguments
    fn read_at(&self, path: &Path, spec: &[String]) -> Option<String>;
    fn patch_at_offset(&self, path: &Path, offset: &str, hex_data: &str) -> bool;
    fn patch_at_custom_offset(&self, path: &Path, pattern: &str, offset: &str, hex_data: &str) -> bool;
    /// Replace `find_hex` with `replace_hex`; `occurrence` 0 means every match
    fn find_replace(&self, path: &Path, find_hex: &str, replace_hex: &str, occurrence: usize) -> bool;
}

/// Where a JSON document comes from
#[derive(Debug, Clone, Copy)]
pub enum JsonSource<'a> {
    Text(&'a str),
    File(&'a Path),
}

/// JSON path lookups: each key is an object member or, when numeric, an array index
pub trait JsonQuery: Send + Sync {
    fn query(&self, source: JsonSource<'_>, keys: &[String]) -> Option<String>;
}

/// Downloads and archive extraction
pub trait Network: Send + Sync {
    fn download(&self, url: &str, dest: &Path) -> bool;
    fn unzip(&self, src: &Path, dest: &Path) -> bool;
}

/// Which boot-loader list a config comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    /// Entries of the main boot config
    Boot,
    /// Entries of the per-file ini directory
    Ini,
}

/// A boot-loader launch entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
    pub name: String,
    pub index: usize,
}

/// Reboot-to-payload support
pub trait BootLoader: Send + Sync {
    fn supports_reboot_to_config(&self) -> bool;
    fn list_configs(&self, kind: ConfigKind) -> Vec<BootConfig>;
    fn reboot_to(&self, config: &BootConfig, kind: ConfigKind) -> bool;
    fn reboot_to_menu(&self) -> bool;
    fn reboot_to_bootloader(&self) -> bool;
    fn reboot_to_ums(&self) -> bool;
    fn reboot_to_payload(&self, payload: &Path) -> bool;
}

/// Power and display control
pub trait Device: Send + Sync {
    fn platform(&self) -> Platform;
    fn reboot(&self);
    fn shutdown(&self);
    fn toggle_backlight(&self);
}

/// All collaborators the engine talks to
pub struct Host {
    pub ini: Box<dyn KeyValueStore>,
    pub hex: Box<dyn BinaryPatcher>,
    pub json: Box<dyn JsonQuery>,
    pub net: Box<dyn Network>,
    pub boot: Box<dyn BootLoader>,
    pub device: Box<dyn Device>,
}

impl Host {
    /// Host for running off-device: JSON works, everything else declines.
    pub fn detached(platform: Platform) -> Self {
        let detached = Detached { platform };
        Self {
            ini: Box::new(detached),
            hex: Box::new(detached),
            json: Box::new(SerdeJsonQuery),
            net: Box::new(detached),
            boot: Box::new(detached),
            device: Box::new(detached),
        }
    }
}

/// Collaborator that logs each request and reports failure
#[derive(Debug, Clone, Copy)]
pub struct Detached {
    pub platform: Platform,
}

impl KeyValueStore for Detached {
    fn get(&self, path: &Path, section: &str, key: &str) -> Option<String> {
        log::info!("detached: ini get {} [{}] {}", path.display(), section, key);
        None
    }
    fn set(&self, path: &Path, section: &str, key: &str, value: &str) -> bool {
        log::info!("detached: ini set {} [{}] {}={}", path.display(), section, key, value);
        false
    }
    fn set_key_name(&self, path: &Path, section: &str, key: &str, new_key: &str) -> bool {
        log::info!("detached: ini rename key {} [{}] {} -> {}", path.display(), section, key, new_key);
        false
    }
    fn add_section(&self, path: &Path, section: &str) -> bool {
        log::info!("detached: ini add [{}] to {}", section, path.display());
        false
    }
    fn rename_section(&self, path: &Path, section: &str, new_section: &str) -> bool {
        log::info!("detached: ini rename [{}] -> [{}] in {}", section, new_section, path.display());
        false
    }
    fn remove_section(&self, path: &Path, section: &str) -> bool {
        log::info!("detached: ini remove [{}] from {}", section, path.display());
        false
    }
}

impl BinaryPatcher for Detached {
    fn read_at(&self, path: &Path, spec: &[String]) -> Option<String> {
        log::info!("detached: hex read {} {:?}", path.display(), spec);
        None
    }
    fn patch_at_offset(&self, path: &Path, offset: &str, hex_data: &str) -> bool {
        log::info!("detached: hex patch {} @{} {}", path.display(), offset, hex_data);
        false
    }
    fn patch_at_custom_offset(&self, path: &Path, pattern: &str, offset: &str, hex_data: &str) -> bool {
        log::info!("detached: hex patch {} {}+{} {}", path.display(), pattern, offset, hex_data);
        false
    }
    fn find_replace(&self, path: &Path, find_hex: &str, replace_hex: &str, occurrence: usize) -> bool {
        log::info!("detached: hex swap {} {} -> {} (#{})", path.display(), find_hex, replace_hex, occurrence);
        false
    }
}

impl Network for Detached {
    fn download(&self, url: &str, dest: &Path) -> bool {
        log::info!("detached: download {} -> {}", url, dest.display());
        false
    }
    fn unzip(&self, src: &Path, dest: &Path) -> bool {
        log::info!("detached: unzip {} -> {}", src.display(), dest.display());
        false
    }
}

impl BootLoader for Detached {
    fn supports_reboot_to_config(&self) -> bool {
        false
    }
    fn list_configs(&self, _kind: ConfigKind) -> Vec<BootConfig> {
        Vec::new()
    }
    fn reboot_to(&self, config: &BootConfig, kind: ConfigKind) -> bool {
        log::info!("detached: reboot to {:?} config {}", kind, config.name);
        false
    }
    fn reboot_to_menu(&self) -> bool {
        log::info!("detached: reboot to boot menu");
        false
    }
    fn reboot_to_bootloader(&self) -> bool {
        log::info!("detached: reboot to boot loader");
        false
    }
    fn reboot_to_ums(&self) -> bool {
        log::info!("detached: reboot to UMS");
        false
    }
    fn reboot_to_payload(&self, payload: &Path) -> bool {
        log::info!("detached: reboot to payload {}", payload.display());
        false
    }
}

impl Device for Detached {
    fn platform(&self) -> Platform {
        self.platform
    }
    fn reboot(&self) {
        log::warn!("detached: device reboot requested");
    }
    fn shutdown(&self) {
        log::warn!("detached: device shutdown requested");
    }
    fn toggle_backlight(&self) {
        log::info!("detached: backlight toggle requested");
    }
}

/// [`JsonQuery`] backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonQuery;

impl JsonQuery for SerdeJsonQuery {
    fn query(&self, source: JsonSource<'_>, keys: &[String]) -> Option<String> {
        let text = match source {
            JsonSource::Text(text) => text.to_string(),
            JsonSource::File(path) => match std::fs::read_to_string(path) {
                Ok(t) => t,
                Err(e) => {
                    log::debug!("json file {}: {}", path.display(), e);
                    return None;
                }
            },
        };
        let root: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("json parse: {}", e);
                return None;
            }
        };

        let mut value = &root;
        for key in keys {
            value = match value {
                serde_json::Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                serde_json::Value::Object(map) => map.get(key.as_str())?,
                _ => return None,
            };
        }
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_json_query_walks_objects_and_arrays() {
        let doc = r#"{"assets":[{"name":"a.zip","size":12},{"name":"b.zip"}]}"#;
        let q = SerdeJsonQuery;
        assert_eq!(q.query(JsonSource::Text(doc), &keys(&["assets", "1", "name"])).as_deref(), Some("b.zip"));
        assert_eq!(q.query(JsonSource::Text(doc), &keys(&["assets", "0", "size"])).as_deref(), Some("12"));
        assert_eq!(q.query(JsonSource::Text(doc), &keys(&["assets", "5"])), None);
        assert_eq!(q.query(JsonSource::Text(doc), &keys(&["missing"])), None);
    }

    #[test]
    fn test_json_query_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.json");
        std::fs::write(&path, r#"{"tag_name":"v1.2.0"}"#).unwrap();
        let found = SerdeJsonQuery.query(JsonSource::File(&path), &keys(&["tag_name"]));
        assert_eq!(found.as_deref(), Some("v1.2.0"));
    }

    #[test]
    fn test_json_query_rejects_garbage() {
        assert_eq!(SerdeJsonQuery.query(JsonSource::Text("{not json"), &keys(&["a"])), None);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Erista".parse::<Platform>(), Ok(Platform::Erista));
        assert_eq!("mariko".parse::<Platform>(), Ok(Platform::Mariko));
        assert!("v3".parse::<Platform>().is_err());
    }
}

//! Placeholder resolution
//!
//! Arguments may embed markers that are replaced by looked-up text before a
//! command runs:
//!
//! | Marker | Replaced by |
//! |---|---|
//! | `{hex_file(pattern, offset, length)}` | bytes read from the bound hex file |
//! | `{ini_file(section, key)}` | a value from the bound ini file |
//! | `{list(N)}` | element `N` of the bound list |
//! | `{json(k1, k2, ...)}` | a value from the bound JSON text |
//! | `{json_file(k1, k2, ...)}` | a value from the bound JSON file |
//!
//! Each family is replaced one occurrence at a time until it no longer
//! appears, the argument stops changing, or a lookup fails. A failed lookup
//! leaves the marker text in place and is reported as a soft failure.
//!
//! Dynamic menus additionally rewrite a whole block once per entry with
//! [`expand_source_entry`], which handles `{file_source}`, `{file_name}`,
//! `{folder_name}` and the `_source` forms of the list/JSON markers.

use crate::config::EngineConfig;
use crate::fsops::{file_name_of, parent_name_of};
use crate::host::{Host, JsonSource};
use crate::parser::{unquote, CommandBlock};
use crate::state::{Binding, Bindings};

const CLOSE: &str = ")}";

/// Minimum substitution budget per marker family in one argument. The budget
/// grows to the number of occurrences present before the first pass.
const MAX_PASSES: usize = 64;

/// Split a marker payload on `,`, trimming and unquoting each component.
fn components(payload: &str) -> Vec<String> {
    payload.split(',').map(|c| unquote(c.trim()).to_string()).collect()
}

/// Items of a bound list: `,`/newline separated, optionally wrapped in `()` or `[]`.
pub fn list_items(list: &str) -> Vec<String> {
    let trimmed = list.trim();
    let inner = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('('), Some(')')) | (Some('['), Some(']')) if trimmed.len() >= 2 => {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => trimmed,
    };
    inner
        .split(|c| c == ',' || c == '\n')
        .map(|s| unquote(s.trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn list_item(list: &str, index: &str) -> Option<String> {
    let index: usize = index.trim().parse().ok()?;
    list_items(list).into_iter().nth(index)
}

/// Replace every occurrence of `marker ... )}` in `arg` with `lookup(payload)`.
///
/// Returns `false` when a marker was present but could not be replaced.
fn splice_marker(
    arg: &mut String,
    marker: &str,
    mut lookup: impl FnMut(&str) -> Option<String>,
) -> bool {
    let mut last = String::new();
    let passes = MAX_PASSES.max(arg.matches(marker).count());
    for _ in 0..passes {
        let Some(start) = arg.find(marker) else {
            return true;
        };
        let payload_start = start + marker.len();
        let Some(close) = arg[payload_start..].find(CLOSE) else {
            log::debug!("unterminated placeholder {:?} in {:?}", marker, arg);
            return false;
        };
        let end = payload_start + close;
        let Some(replacement) = lookup(&arg[payload_start..end]) else {
            log::debug!("unresolved placeholder {:?}", &arg[start..end + CLOSE.len()]);
            return false;
        };
        arg.replace_range(start..end + CLOSE.len(), &replacement);
        if *arg == last {
            return false;
        }
        last.clone_from(arg);
    }
    !arg.contains(marker)
}

/// Resolves placeholders against one invocation's bindings
pub struct Resolver<'a> {
    config: &'a EngineConfig,
    host: &'a Host,
    bindings: &'a Bindings,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a EngineConfig, host: &'a Host, bindings: &'a Bindings) -> Self {
        Self { config, host, bindings }
    }

    /// Resolve every marker in `arg`. The flag is `false` if any marker failed.
    pub fn resolve(&self, arg: &str) -> (String, bool) {
        let mut out = arg.to_string();
        let mut ok = true;

        ok &= self.family(&mut out, "{hex_file(", Binding::HexFile, |bound, payload| {
            let path = self.config.host_path(bound);
            self.host.hex.read_at(&path, &components(payload))
        });
        ok &= self.family(&mut out, "{ini_file(", Binding::IniFile, |bound, payload| {
            let parts = components(payload);
            if parts.len() != 2 {
                return None;
            }
            let path = self.config.host_path(bound);
            self.host.ini.get(&path, &parts[0], &parts[1])
        });
        ok &= self.family(&mut out, "{list(", Binding::List, list_item);
        ok &= self.family(&mut out, "{json(", Binding::Json, |bound, payload| {
            self.host.json.query(JsonSource::Text(bound), &components(payload))
        });
        ok &= self.family(&mut out, "{json_file(", Binding::JsonFile, |bound, payload| {
            let path = self.config.host_path(bound);
            self.host.json.query(JsonSource::File(&path), &components(payload))
        });

        (out, ok)
    }

    /// Resolve each argument of a command. The name itself is left alone.
    pub fn resolve_command(&self, command: &[String]) -> (Vec<String>, bool) {
        let mut ok = true;
        let mut out = Vec::with_capacity(command.len());
        for (i, token) in command.iter().enumerate() {
            if i == 0 {
                out.push(token.clone());
                continue;
            }
            let (resolved, resolved_ok) = self.resolve(token);
            ok &= resolved_ok;
            out.push(resolved);
        }
        (out, ok)
    }

    fn family(
        &self,
        arg: &mut String,
        marker: &str,
        binding: Binding,
        lookup: impl Fn(&str, &str) -> Option<String>,
    ) -> bool {
        if !arg.contains(marker) {
            return true;
        }
        match self.bindings.get(binding) {
            Some(bound) => splice_marker(arg, marker, |payload| lookup(bound, payload)),
            None => {
                log::debug!("placeholder {:?} used with nothing bound", marker);
                false
            }
        }
    }
}

/// Rewrite `block` for one dynamic-menu entry.
///
/// `entry` is the entry's path (or list item) and `index` its position. A
/// `*` inside a `_source` payload stands for `index`. Sources are taken from
/// `list_source`, `json_source` and `json_file_source` commands in the block,
/// each bound by its first occurrence. Unresolvable markers are left as-is.
pub fn expand_source_entry(
    block: &CommandBlock,
    entry: &str,
    index: usize,
    host: &Host,
    config: &EngineConfig,
) -> CommandBlock {
    let mut bindings = Bindings::default();
    let index_text = index.to_string();
    let payload_index = |payload: &str| payload.replace('*', &index_text);

    block
        .iter()
        .map(|command| {
            if let (Some(name), Some(value)) = (command.first(), command.get(1)) {
                match name.as_str() {
                    "list_source" => { bindings.bind(Binding::List, unquote(value)); }
                    "json_source" => { bindings.bind(Binding::Json, value.as_str()); }
                    "json_file_source" => { bindings.bind(Binding::JsonFile, unquote(value)); }
                    _ => {}
                }
            }

            command
                .iter()
                .map(|token| {
                    let mut arg = token
                        .replace("{file_source}", entry)
                        .replace("{file_name}", file_name_of(entry))
                        .replace("{folder_name}", parent_name_of(entry));

                    if let Some(list) = bindings.get(Binding::List) {
                        splice_marker(&mut arg, "{list_source(", |p| list_item(list, &payload_index(p)));
                    }
                    if let Some(text) = bindings.get(Binding::Json) {
                        splice_marker(&mut arg, "{json_source(", |p| {
                            host.json.query(JsonSource::Text(text), &components(&payload_index(p)))
                        });
                    }
                    if let Some(file) = bindings.get(Binding::JsonFile) {
                        let path = config.host_path(file);
                        splice_marker(&mut arg, "{json_file_source(", |p| {
                            host.json.query(JsonSource::File(&path), &components(&payload_index(p)))
                        });
                    }
                    arg
                })
                .collect()
        })
        .collect()
}

//! Wildcard path expansion
//!
//! A pattern without `*` is returned as its own single match, unchecked, so
//! names such as `Game [0100ABCD].nsp` stay literal. Otherwise every
//! `/`-separated segment holding a `*` is matched against directory entries
//! with shell glob rules (`*`, `?`, `[...]`), descending one level per
//! segment. A trailing `/` on the pattern restricts the final matches to
//! directories.

use std::path::{Path, PathBuf};
use globset::{GlobBuilder, GlobMatcher};

/// Whether `s` is a pattern rather than a literal path.
pub fn has_wildcard(s: &str) -> bool {
    s.contains('*')
}

fn segment_matcher(segment: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(segment).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            log::debug!("invalid glob segment {:?}: {}", segment, e);
            None
        }
    }
}

/// Entry names of `dir`, sorted. Unreadable directories yield nothing.
fn entry_names(dir: &Path) -> Vec<String> {
    let read_from = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let Ok(entries) = std::fs::read_dir(read_from) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Expand `pattern` into the existing paths it matches.
pub fn expand(pattern: &Path) -> Vec<PathBuf> {
    let text = pattern.to_string_lossy();
    if !has_wildcard(&text) {
        return vec![pattern.to_path_buf()];
    }

    let dirs_only = text.ends_with('/');
    let parts: Vec<&str> = text.split('/').filter(|s| !s.is_empty()).collect();
    let first_wild = parts.iter().position(|p| has_wildcard(p)).unwrap_or(0);

    let mut base = if text.starts_with('/') { PathBuf::from("/") } else { PathBuf::new() };
    for part in &parts[..first_wild] {
        base.push(part);
    }

    let remaining = &parts[first_wild..];
    let mut frontier = vec![base];
    for (i, segment) in remaining.iter().enumerate() {
        let last = i + 1 == remaining.len();
        let keep = |path: &Path| {
            if last {
                !dirs_only || path.is_dir()
            } else {
                path.is_dir()
            }
        };

        let mut next = Vec::new();
        if has_wildcard(segment) {
            let Some(matcher) = segment_matcher(segment) else {
                return Vec::new();
            };
            for dir in &frontier {
                for name in entry_names(dir) {
                    if !matcher.is_match(&name) {
                        continue;
                    }
                    let path = dir.join(&name);
                    if keep(&path) {
                        next.push(path);
                    }
                }
            }
        } else {
            for dir in &frontier {
                let path = dir.join(segment);
                if path.exists() && keep(&path) {
                    next.push(path);
                }
            }
        }
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }
    frontier
}

//! Safety guard for destructive commands
//!
//! `delete` and `move` consult [`is_dangerous_combination`] on the resolved
//! script path before touching anything. This is a string-level check on the
//! virtual path, not a sandbox: symlinks and races are out of its reach.

/// Roots that may never be deleted or moved wholesale.
pub const PROTECTED_ROOTS: &[&str] = &[
    "sdmc:/Nintendo/",
    "sdmc:/emuMMC/",
    "sdmc:/atmosphere/",
    "sdmc:/bootloader/",
    "sdmc:/switch/",
    "sdmc:/config/",
    "sdmc:/",
];

/// Roots where nothing at or below may be deleted or moved.
pub const ULTRA_PROTECTED_ROOTS: &[&str] = &[
    "sdmc:/Nintendo/",
    "sdmc:/emuMMC/",
];

const TRAVERSAL: &[&str] = &["..", "~"];
const BARE_WILDCARDS: &[&str] = &["*", "*/"];
const WILDCARD_CHARS: &[char] = &['*', '?', '['];

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether `pattern` must be refused by delete/move.
///
/// Roots are matched with their trailing `/`: `sdmc:/Nintendo` without it is
/// only a child of `sdmc:/` and passes.
pub fn is_dangerous_combination(pattern: &str) -> bool {
    if ULTRA_PROTECTED_ROOTS.iter().any(|root| pattern.starts_with(root)) {
        return true;
    }

    for root in PROTECTED_ROOTS {
        if pattern == *root {
            return true;
        }
        if let Some(rest) = pattern.strip_prefix(root) {
            if BARE_WILDCARDS.contains(&rest) {
                return true;
            }
            let traverses = segments(rest)
                .any(|seg| TRAVERSAL.iter().any(|t| seg.contains(t)));
            if traverses {
                return true;
            }
        }
    }

    if let Some(idx) = pattern.find(":/") {
        let (volume, rest) = pattern.split_at(idx + 2);
        if segments(rest).any(|seg| TRAVERSAL.contains(&seg)) {
            return true;
        }
        if volume.contains(WILDCARD_CHARS) {
            return true;
        }
    }

    TRAVERSAL.iter().any(|t| pattern.contains(t))
}

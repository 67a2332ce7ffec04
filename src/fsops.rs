//! Filesystem primitives behind the file commands
//!
//! All functions take host paths. Directory handles are scoped to the
//! iterator that reads them, so every early return closes them.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Chunk size for streamed file copies.
const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Whether a host path was written with a trailing separator.
pub fn ends_with_separator(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR)
}

/// Create `path` and any missing parents. Existing directories are fine.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Copy one file by streaming its bytes, replacing any file at `dst`.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if src == dst {
        return Ok(fs::metadata(src)?.len());
    }
    let mut reader = File::open(src)?;
    ensure_parent(dst)?;
    if fs::symlink_metadata(dst).map(|m| !m.is_dir()).unwrap_or(false) {
        fs::remove_file(dst)?;
    }

    let mut writer = File::create(dst)?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// Copy directory `src` so that its contents appear under `dst`.
///
/// `dst` must not lie inside `src`.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if src == dst {
        return Ok(());
    }
    if dst.starts_with(src) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot copy {} into itself ({})", src.display(), dst.display()),
        ));
    }
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

/// Copy a file or a directory tree to exactly `dst`.
pub fn copy_entry(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    if meta.is_dir() {
        copy_tree(src, dst)
    } else {
        copy_file(src, dst).map(|_| ())
    }
}

/// Delete a file or a directory tree, children first. Missing paths are a no-op.
pub fn delete_tree(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        for entry in fs::read_dir(path)? {
            delete_tree(&entry?.path())?;
        }
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Move a file or directory.
///
/// A directory is copied to exactly `dst` and then deleted. A file lands at
/// `dst`, or inside it when `dst` ends with a separator or is an existing
/// directory; any file already there is replaced. File moves are a single
/// rename, so a cross-device move fails instead of copying.
pub fn move_entry(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    ensure_parent(dst)?;

    if meta.is_dir() {
        copy_tree(src, dst)?;
        return delete_tree(src);
    }

    let target = if ends_with_separator(dst) || dst.is_dir() {
        match src.file_name() {
            Some(name) => dst.join(name),
            None => dst.to_path_buf(),
        }
    } else {
        dst.to_path_buf()
    };
    if target.is_file() {
        fs::remove_file(&target)?;
    }
    ensure_parent(&target)?;
    fs::rename(src, &target)
}

/// One path found under a mirror source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    /// Path relative to the source root; empty for the root itself
    pub relative: PathBuf,
    pub is_dir: bool,
}

/// Every path under `root`, the root first, parents before children.
pub fn mirror_entries(root: &Path) -> Vec<MirrorEntry> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::debug!("mirror walk: {}", err);
                None
            }
        })
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            Some(MirrorEntry { relative, is_dir: e.file_type().is_dir() })
        })
        .collect()
}

/// Replicate the tree under `source_root` onto `target_root`.
///
/// Pairs whose source and target are the same path are skipped. Returns the
/// number of files copied.
pub fn mirror_copy(source_root: &Path, target_root: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in mirror_entries(source_root) {
        let from = source_root.join(&entry.relative);
        let to = target_root.join(&entry.relative);
        if from == to {
            continue;
        }
        if entry.is_dir {
            fs::create_dir_all(&to)?;
        } else {
            copy_file(&from, &to)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove from `target_root` every path that exists under `source_root`.
///
/// Files are deleted; directories are removed only once empty, so unrelated
/// content in the target survives. The target root itself is never removed.
/// `refuse` is asked about each relative path before anything is touched.
/// Returns the number of files deleted.
pub fn mirror_delete(
    source_root: &Path,
    target_root: &Path,
    refuse: impl Fn(&Path) -> bool,
) -> io::Result<usize> {
    let mut deleted = 0;
    for entry in mirror_entries(source_root).into_iter().rev() {
        if entry.relative.as_os_str().is_empty() {
            continue;
        }
        let from = source_root.join(&entry.relative);
        let to = target_root.join(&entry.relative);
        if from == to || refuse(&entry.relative) {
            continue;
        }
        if entry.is_dir {
            if to.is_dir() && fs::read_dir(&to)?.next().is_none() {
                fs::remove_dir(&to)?;
            }
        } else if fs::symlink_metadata(&to).map(|m| !m.is_dir()).unwrap_or(false) {
            fs::remove_file(&to)?;
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Join a relative path onto a `/`-separated script path.
pub fn join_script_path(base: &str, relative: &Path) -> String {
    let rel = relative.to_string_lossy().replace('\\', "/");
    if base.ends_with('/') || base.is_empty() {
        format!("{}{}", base, rel)
    } else {
        format!("{}/{}", base, rel)
    }
}

/// Last path component as a string, ignoring a trailing separator.
pub fn file_name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Name of the directory that contains `path`.
pub fn parent_name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => file_name_of(&trimmed[..idx]),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, data: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut out: Vec<_> = walkdir::WalkDir::new(root).into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().strip_prefix(root).unwrap().to_path_buf(), fs::read(e.path()).unwrap()))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_copy_tree_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src.join("a"), b"alpha");
        write(&src.join("b/c"), &vec![7u8; COPY_BUFFER_SIZE * 2 + 3]);
        let dst = dir.path().join("dst");

        copy_tree(&src, &dst).unwrap();
        let once = snapshot(&dst);
        copy_tree(&src, &dst).unwrap();
        assert_eq!(snapshot(&dst), once);
        assert_eq!(once, snapshot(&src));
    }

    #[test]
    fn test_copy_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("new");
        let dst = dir.path().join("out/old");
        write(&src, b"short");
        write(&dst, b"a much longer previous body");
        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"short");
    }

    #[test]
    fn test_copy_file_missing_source_keeps_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out/kept");
        write(&dst, b"previous");
        let err = copy_file(&dir.path().join("absent"), &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs::read(&dst).unwrap(), b"previous");
    }

    #[test]
    fn test_copy_tree_into_itself_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src.join("a"), b"x");
        let err = copy_tree(&src, &src.join("inner")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_delete_tree_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        write(&root.join("x/y/z"), b"1");
        write(&root.join("w"), b"2");
        delete_tree(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        delete_tree(&dir.path().join("nothing")).unwrap();
    }

    #[test]
    fn test_move_file_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        write(&src, b"data");
        let dst = PathBuf::from(format!("{}/out/", dir.path().display()));
        move_entry(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(dir.path().join("out/a.txt")).unwrap(), b"data");
    }

    #[test]
    fn test_move_file_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        write(&src, b"new");
        write(&dst, b"old");
        move_entry(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_move_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pkg");
        write(&src.join("sub/f"), b"f");
        let dst = dir.path().join("moved");
        move_entry(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(dst.join("sub/f")).unwrap(), b"f");
    }

    #[test]
    fn test_mirror_copy_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        write(&src.join("a"), b"A");
        write(&src.join("b/c"), b"C");
        write(&dst.join("keep"), b"K");

        assert_eq!(mirror_copy(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read(dst.join("a")).unwrap(), b"A");
        assert_eq!(fs::read(dst.join("b/c")).unwrap(), b"C");

        assert_eq!(mirror_delete(&src, &dst, |_| false).unwrap(), 2);
        assert!(dst.is_dir());
        assert!(!dst.join("a").exists());
        assert!(!dst.join("b/c").exists());
        assert!(dst.join("keep").exists());
    }

    #[test]
    fn test_mirror_delete_keeps_foreign_files_in_shared_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        write(&src.join("b/c"), b"C");
        write(&dst.join("b/c"), b"C");
        write(&dst.join("b/other"), b"O");
        mirror_delete(&src, &dst, |_| false).unwrap();
        assert!(!dst.join("b/c").exists());
        assert!(dst.join("b/other").exists());
    }

    #[test]
    fn test_mirror_delete_respects_refusal() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        write(&src.join("a"), b"A");
        write(&dst.join("a"), b"A");
        assert_eq!(mirror_delete(&src, &dst, |_| true).unwrap(), 0);
        assert!(dst.join("a").exists());
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(file_name_of("sdmc:/switch/app.nro"), "app.nro");
        assert_eq!(file_name_of("sdmc:/switch/pkg/"), "pkg");
        assert_eq!(parent_name_of("sdmc:/switch/pkg/app.nro"), "pkg");
        assert_eq!(join_script_path("sdmc:/", Path::new("a/b")), "sdmc:/a/b");
        assert_eq!(join_script_path("sdmc:/x", Path::new("a")), "sdmc:/x/a");
    }
}

//! File operation commands: make, copy, delete, move, mirror_copy, mirror_delete

use std::path::{Path, PathBuf};

use super::Ctx;
use crate::error::ScriptError;
use crate::fsops;
use crate::guard::is_dangerous_combination;
use crate::pattern::{expand, has_wildcard};

/// `dst/<name of src>`
fn into_dir(dst: &Path, src: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) => dst.join(name),
        None => dst.to_path_buf(),
    }
}

// ──────────────────────────────────────────────────────────
// make — create a directory
// ──────────────────────────────────────────────────────────

pub(super) fn make(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let dir = ctx.path_arg(&args[0]);
    fsops::ensure_dir(&ctx.host_path(&dir))?;
    Ok(())
}

// ──────────────────────────────────────────────────────────
// copy — copy files or trees
// ──────────────────────────────────────────────────────────

/// A file lands inside `dst` when `dst` ends with `/` or is a directory.
/// A directory's contents land under `dst`. Wildcard matches each land
/// inside `dst` under their own name.
pub(super) fn copy(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let src = ctx.path_arg(&args[0]);
    let dst = ctx.host_path(&ctx.path_arg(&args[1]));

    if has_wildcard(&src) {
        for found in expand(&ctx.host_path(&src)) {
            fsops::copy_entry(&found, &into_dir(&dst, &found))?;
        }
        return Ok(());
    }

    let from = ctx.host_path(&src);
    if !from.exists() {
        log::debug!("copy: {} does not exist", src);
        return Ok(());
    }
    if from.is_dir() {
        fsops::copy_tree(&from, &dst)?;
    } else if fsops::ends_with_separator(&dst) || dst.is_dir() {
        fsops::copy_file(&from, &into_dir(&dst, &from))?;
    } else {
        fsops::copy_file(&from, &dst)?;
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────
// delete — remove files or trees
// ──────────────────────────────────────────────────────────

pub(super) fn delete(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let target = ctx.path_arg(&args[0]);
    if is_dangerous_combination(&target) {
        return Err(ScriptError::refused(&target));
    }

    for found in expand(&ctx.host_path(&target)) {
        fsops::delete_tree(&found)?;
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────
// move — move or rename
// ──────────────────────────────────────────────────────────

pub(super) fn move_(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let src = ctx.path_arg(&args[0]);
    if is_dangerous_combination(&src) {
        return Err(ScriptError::refused(&src));
    }
    let dst = ctx.host_path(&ctx.path_arg(&args[1]));

    if has_wildcard(&src) {
        for found in expand(&ctx.host_path(&src)) {
            fsops::move_entry(&found, &into_dir(&dst, &found))?;
        }
        return Ok(());
    }

    let from = ctx.host_path(&src);
    if !from.exists() {
        return Err(ScriptError::not_found(format!("{} does not exist", src)));
    }
    fsops::move_entry(&from, &dst)?;
    Ok(())
}

// ──────────────────────────────────────────────────────────
// mirror_copy / mirror_delete — replicate a tree onto a root
// ──────────────────────────────────────────────────────────

fn mirror_roots(ctx: &Ctx<'_>, args: &[String]) -> (String, String) {
    let source = ctx.path_arg(&args[0]);
    let target = match args.get(1) {
        Some(t) => ctx.path_arg(t),
        None => ctx.config.mirror_default_target.clone(),
    };
    (source, target)
}

pub(super) fn mirror_copy(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let (source, target) = mirror_roots(ctx, args);
    let copied = fsops::mirror_copy(&ctx.host_path(&source), &ctx.host_path(&target))?;
    log::debug!("mirror_copy {} -> {}: {} files", source, target, copied);
    Ok(())
}

pub(super) fn mirror_delete(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let (source, target) = mirror_roots(ctx, args);
    let refuse = |relative: &Path| {
        let virtual_target = fsops::join_script_path(&target, relative);
        let dangerous = is_dangerous_combination(&virtual_target);
        if dangerous {
            log::info!("mirror_delete: refusing {}", virtual_target);
        }
        dangerous
    };
    let deleted = fsops::mirror_delete(&ctx.host_path(&source), &ctx.host_path(&target), refuse)?;
    log::debug!("mirror_delete {} -> {}: {} files", source, target, deleted);
    Ok(())
}

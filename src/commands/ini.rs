//! Ini commands, delegated to the key-value store

use super::Ctx;
use crate::error::ScriptError;
use crate::parser::unquote;

fn store_result(ok: bool, what: &str, file: &str) -> Result<(), ScriptError> {
    if ok {
        Ok(())
    } else {
        Err(ScriptError::collaborator(format!("{} failed for {}", what, file)))
    }
}

/// Remaining tokens joined by single spaces.
fn joined(rest: &[String]) -> String {
    rest.join(" ")
}

pub(super) fn add_section(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let ok = ctx.host.ini.add_section(&ctx.host_path(&file), unquote(&args[1]));
    store_result(ok, "add-ini-section", &file)
}

pub(super) fn rename_section(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let ok = ctx.host.ini.rename_section(&ctx.host_path(&file), unquote(&args[1]), unquote(&args[2]));
    store_result(ok, "rename-ini-section", &file)
}

pub(super) fn remove_section(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let ok = ctx.host.ini.remove_section(&ctx.host_path(&file), unquote(&args[1]));
    store_result(ok, "remove-ini-section", &file)
}

pub(super) fn set_value(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let value = joined(&args[3..]);
    let ok = ctx.host.ini.set(&ctx.host_path(&file), unquote(&args[1]), unquote(&args[2]), &value);
    store_result(ok, "set-ini-val", &file)
}

pub(super) fn set_key(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let new_key = joined(&args[3..]);
    let ok = ctx.host.ini.set_key_name(&ctx.host_path(&file), unquote(&args[1]), unquote(&args[2]), &new_key);
    store_result(ok, "set-ini-key", &file)
}

/// `footer=<value>` in the running option's section of the package config.
pub(super) fn set_footer(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = format!("{}{}", ctx.state.script_dir, ctx.config.package_config_name);
    let ok = ctx.host.ini.set(
        &ctx.host_path(&file),
        &ctx.state.option_name,
        "footer",
        unquote(&args[0]),
    );
    store_result(ok, "set-footer", &file)
}

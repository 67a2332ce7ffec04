//! Device and network commands: download, unzip, reboot, shutdown, backlight, clear

use super::Ctx;
use crate::error::ScriptError;
use crate::fsops;
use crate::host::{BootLoader, ConfigKind, Platform};
use crate::parser::unquote;

// ──────────────────────────────────────────────────────────
// download / unzip — failures lower the success flag
// ──────────────────────────────────────────────────────────

pub(super) fn download(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let url = unquote(&args[0]);
    let dest = ctx.path_arg(&args[1]);
    let ok = ctx.host.net.download(url, &ctx.host_path(&dest));
    if !ok {
        log::info!("download {} -> {} failed", url, dest);
    }
    ctx.session.command_success &= ok;
    Ok(())
}

pub(super) fn unzip(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let archive = ctx.path_arg(&args[0]);
    let dest = ctx.path_arg(&args[1]);
    let ok = ctx.host.net.unzip(&ctx.host_path(&archive), &ctx.host_path(&dest));
    if !ok {
        log::info!("unzip {} -> {} failed", archive, dest);
    }
    ctx.session.command_success &= ok;
    Ok(())
}

// ──────────────────────────────────────────────────────────
// reboot — boot-loader targets, then the device fallback
// ──────────────────────────────────────────────────────────

/// Reboot into the config at a numeric index, or the first one named `option`.
fn reboot_to_listed(boot: &dyn BootLoader, kind: ConfigKind, option: &str) -> bool {
    let configs = boot.list_configs(kind);
    let found = if !option.is_empty() && option.bytes().all(|b| b.is_ascii_digit()) {
        option.parse::<usize>().ok().and_then(|i| configs.get(i))
    } else {
        configs.iter().find(|c| c.name == option)
    };
    match found {
        Some(config) => boot.reboot_to(config, kind),
        None => {
            log::info!("reboot: no {:?} config {:?}", kind, option);
            false
        }
    }
}

fn reboot_to_payload(ctx: &Ctx<'_>, payload: &str) -> bool {
    let host_payload = ctx.host_path(payload);
    if !host_payload.exists() {
        log::info!("reboot: unknown target {}", payload);
        return false;
    }
    let name = fsops::file_name_of(payload);
    if ctx.host.device.platform() == Platform::Erista {
        return ctx.host.boot.reboot_to_payload(&host_payload);
    }

    let entry = ctx.host_path(&format!("{}bootloader/ini/{}.ini", crate::config::SD_PREFIX, name));
    if !ctx.host.ini.set(&entry, name, "payload", payload) {
        log::info!("reboot: could not write {}", entry.display());
    }
    reboot_to_listed(ctx.host.boot.as_ref(), ConfigKind::Ini, name)
}

/// Targets are only tried where the boot loader can honour them. The device
/// reboot at the end always runs.
pub(super) fn reboot(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let boot = ctx.host.boot.as_ref();
    if ctx.host.device.platform() == Platform::Erista || boot.supports_reboot_to_config() {
        match args.first().map(|a| unquote(a)) {
            None => {
                boot.reboot_to_bootloader();
            }
            Some(kind @ ("boot" | "ini")) => {
                if let Some(option) = args.get(1) {
                    let kind = if kind == "boot" { ConfigKind::Boot } else { ConfigKind::Ini };
                    reboot_to_listed(boot, kind, unquote(option));
                }
            }
            Some("UMS") => {
                boot.reboot_to_ums();
            }
            Some("HEKATE" | "hekate") => {
                boot.reboot_to_menu();
            }
            Some(_) => {
                let payload = ctx.path_arg(&args[0]);
                reboot_to_payload(ctx, &payload);
            }
        }
    }

    ctx.host.device.reboot();
    Ok(())
}

pub(super) fn shutdown(ctx: &mut Ctx<'_>) -> Result<(), ScriptError> {
    ctx.host.device.shutdown();
    Ok(())
}

pub(super) fn backlight(ctx: &mut Ctx<'_>) -> Result<(), ScriptError> {
    ctx.host.device.toggle_backlight();
    Ok(())
}

// ──────────────────────────────────────────────────────────
// clear — clear log
// ──────────────────────────────────────────────────────────

pub(super) fn clear(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    if unquote(&args[0]) == "log" {
        fsops::delete_tree(&ctx.host_path(&ctx.config.log_file))?;
    }
    Ok(())
}

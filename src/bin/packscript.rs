//! packscript CLI
//!
//! Run an option of a package script against a directory standing in for the SD card.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use packscript::{command_table, Platform, ScriptRunnerBuilder, SD_PREFIX};

#[derive(Parser, Debug)]
#[command(name = "packscript")]
#[command(version)]
#[command(about = "Run options of INI-sectioned package scripts")]
struct Cli {
    /// Script to run: a host path under --root, or a volume path such as sdmc:/switch/.packages/x/package.ini
    script: Option<String>,

    /// Option (section) to run
    option: Option<String>,

    /// Host directory mapped to sdmc:/
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Platform the detached host reports
    #[arg(short, long, default_value = "erista")]
    platform: Platform,

    /// Skip commands in platform sections that do not match --platform
    #[arg(long)]
    strict_platform: bool,

    /// List the script's options instead of running one
    #[arg(short, long)]
    list: bool,

    /// List available commands
    #[arg(long = "list-commands")]
    list_commands: bool,

    /// Verbose output: debug logging and the execution transcript
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_commands {
        print_commands();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Script path as the engine addresses it.
fn volume_path(script: &str, root: &Path) -> anyhow::Result<String> {
    if script.contains(":/") {
        return Ok(script.to_string());
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("root {}", root.display()))?;
    let host = Path::new(script)
        .canonicalize()
        .with_context(|| format!("script {}", script))?;
    let Ok(relative) = host.strip_prefix(&root) else {
        bail!("{} is not under {}", host.display(), root.display());
    };
    Ok(format!("{}{}", SD_PREFIX, relative.to_string_lossy().replace('\\', "/")))
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let Some(script) = cli.script.as_deref() else {
        bail!("no script given");
    };
    let script = volume_path(script, &cli.root)?;

    let runner = ScriptRunnerBuilder::new(script.as_str())
        .root(&cli.root)
        .platform(cli.platform)
        .strict_platform_sections(cli.strict_platform)
        .build();

    if cli.list || cli.option.is_none() {
        let options = runner.options().with_context(|| format!("loading {}", script))?;
        for option in &options {
            println!("[{}] {} command(s)", option.name, option.commands.len());
        }
        return Ok(true);
    }

    let option = cli.option.as_deref().unwrap_or_default();
    let report = runner.run_option(option)?;
    if cli.verbose && !report.log.is_empty() {
        for line in report.log.lines() {
            println!("      {}", line);
        }
    }
    println!("{}", report.summary());
    Ok(report.success)
}

fn print_commands() {
    println!("Built-in commands:");
    println!();

    for (op, names) in command_table() {
        let usage = op.usage();
        println!("  {:<28} {} {}", names.join(", "), usage.summary, usage.args);
    }

    println!();
    println!("Markers:");
    println!("  try:                         Start a retry chain");
    println!("  erista: / mariko:            Start a platform section");
}

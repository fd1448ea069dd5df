//! The discovery run

use std::io::IsTerminal;
use std::sync::Arc;

use colored::Colorize;
use dialoguer::Confirm;

use netpilot_core::{ConfigPreview, Pipeline, RunReport, Settings};
use netpilot_drivers::RuleDatabase;
use netpilot_system::{CommandRunner, KldLoader, PkgInstaller, SystemDiscovery};

use super::render::{format_previews, format_report};
use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Discover, load drivers and apply the configuration the flags ask for.
pub async fn run_discovery(cli: &Cli) -> Result<()> {
    let mut settings = Settings::resolve(cli.config.as_deref())?;
    if let Some(backup_dir) = &cli.backup_dir {
        settings.backup_dir = backup_dir.clone();
    }
    let options = cli.run_options();

    let runner = CommandRunner::new(settings.command_timeout());
    let mut pipeline = Pipeline::from_settings(
        &settings,
        Arc::new(RuleDatabase::builtin()?),
        Arc::new(SystemDiscovery::new(runner.clone()).with_max_workers(settings.max_workers)),
        Arc::new(KldLoader::new(runner.clone())),
        Arc::new(PkgInstaller::new(runner)),
    );

    let mut report = pipeline.discover(&options).await;

    if options.preview_config {
        report.config_preview = pipeline.preview(&report, &options);
        return print_report(&report, cli, true);
    }

    if options.writes_config() {
        if !cli.yes {
            confirm_write(&pipeline.preview(&report, &options), cli.json)?;
        }
        pipeline.apply(&mut report, &options);
    }

    print_report(&report, cli, false)
}

fn print_report(report: &RunReport, cli: &Cli, with_previews: bool) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    print!("{}", format_report(report, cli.verbose));
    if with_previews {
        println!();
        println!("{}", "Configuration changes (not applied):".bold());
        print!("{}", format_previews(&report.config_preview));
    }
    if report.has_sync_failures() {
        println!();
        println!("{}", "Some configuration files could not be updated.".red().bold());
    }
    Ok(())
}

/// Show pending changes and ask before touching system files.
///
/// Returns without prompting when nothing would change.
fn confirm_write(previews: &[ConfigPreview], json: bool) -> Result<()> {
    if previews.iter().all(|p| p.changes.is_empty() && p.error.is_none()) {
        return Ok(());
    }

    let rendered = format_previews(previews);
    if json {
        eprint!("{}", rendered);
    } else {
        print!("{}", rendered);
    }

    if !std::io::stdin().is_terminal() {
        return Err(CliError::user(
            "Refusing to modify system configuration without confirmation; pass --yes to proceed",
        ));
    }

    let confirmed = Confirm::new()
        .with_prompt("Apply these configuration changes?")
        .default(false)
        .interact()?;

    if confirmed {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

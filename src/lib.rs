//! Doppelganger - duplicate file finder
//!
//! Walks one or more directory trees, narrows the files down to those that
//! share a size with another file, fingerprints the survivors with SHA-256 on
//! a worker pool, and reports groups of byte-identical files. Confirmed
//! copies can then be removed, which updates the groups in place.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pool;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};

use crate::actions::DeleteConfig;
use crate::cli::{Cli, Commands, ConfigAction, ConfigArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, ScanReport, ScanSession};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::ExtensionFilter;

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error for invalid arguments, an unreadable config file, an
/// interrupted scan ([`duplicates::FinderError::Interrupted`]) or a failure
/// to write the report. Per-file problems are not errors; they end up in the
/// report and turn the exit code into [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => run_scan(args, cli.quiet, cli.no_color),
        Commands::Config(args) => run_config(&args),
    }
}

fn run_scan(args: ScanArgs, quiet: bool, no_color: bool) -> Result<ExitCode> {
    if !args.remove.is_empty() && !args.yes {
        bail!(
            "--remove would delete {} path(s); pass --yes to confirm",
            args.remove.len()
        );
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let extensions = if args.extensions.is_empty() {
        config.extension_filter()
    } else {
        ExtensionFilter::new(&args.extensions)
    };
    let io_threads = args
        .io_threads
        .map(usize::from)
        .or(config.io_threads)
        .unwrap_or(0);
    let delete_config = if args.trash || config.trash {
        DeleteConfig::trash()
    } else {
        DeleteConfig::permanent()
    };

    let shutdown = signal::install_handler()?;
    let finder_config = FinderConfig::default()
        .with_roots(args.roots)
        .with_extensions(extensions)
        .with_io_threads(io_threads)
        .with_skip_empty(args.skip_empty)
        .with_shutdown_flag(shutdown.flag());
    let mut finder = DuplicateFinder::new(finder_config)?;

    log::debug!(
        "Scanning with {} hash thread(s), extensions: {:?}",
        finder.io_threads(),
        finder.config().extensions.iter().collect::<Vec<_>>()
    );

    let show_progress = !quiet && !args.no_progress && io::stderr().is_terminal();
    let mut progress = Progress::new(show_progress);
    progress.start();
    let report = finder.scan_with(|event| progress.on_event(event));
    progress.finish();
    let report = report?;

    let removal = if args.remove.is_empty() {
        None
    } else {
        Some(finder.request_removal(&args.remove, &delete_config)?)
    };
    let report = finder.session().map_or(report, ScanSession::report);

    for issue in &report.issues {
        log::warn!("{}: {}", issue.path.display(), issue);
    }

    let exit_code = exit_code_for(&report);
    let color = !no_color && io::stdout().is_terminal();
    let mut out = io::stdout().lock();

    match args.output {
        OutputFormat::Text => TextOutput::new(&report)
            .with_removal(removal.as_ref())
            .with_color(color)
            .write_to(&mut out)
            .context("writing report")?,
        OutputFormat::Json => JsonOutput::new(&report, exit_code)
            .with_removal(removal.as_ref())
            .write_to(&mut out, true)?,
    }

    Ok(exit_code)
}

fn run_config(args: &ConfigArgs) -> Result<ExitCode> {
    match args.action {
        ConfigAction::Path => println!("{}", Config::config_path()?.display()),
        ConfigAction::Show => println!("{}", serde_json::to_string_pretty(&Config::load())?),
        ConfigAction::Init => {
            let path = Config::config_path()?;
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                Config::default().save_to(&path)?;
                println!("Wrote default config to {}", path.display());
            }
        }
    }
    Ok(ExitCode::Success)
}

/// Exit code for a finished scan.
#[must_use]
pub fn exit_code_for(report: &ScanReport) -> ExitCode {
    if report.groups.is_empty() {
        ExitCode::NoDuplicates
    } else if !report.issues.is_empty() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::DuplicateGroup;
    use crate::error::{FailureKind, Issue};
    use std::path::PathBuf;

    fn report_with(groups: usize, issues: usize) -> ScanReport {
        ScanReport {
            groups: (0..groups)
                .map(|i| {
                    DuplicateGroup::new(
                        [i as u8; 32],
                        1,
                        vec![PathBuf::from(format!("/a{i}")), PathBuf::from(format!("/b{i}"))],
                    )
                })
                .collect(),
            issues: (0..issues)
                .map(|_| Issue::new("/x", FailureKind::EntryUnreadable, "denied"))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exit_code_for_report() {
        assert_eq!(exit_code_for(&report_with(0, 0)), ExitCode::NoDuplicates);
        assert_eq!(exit_code_for(&report_with(0, 2)), ExitCode::NoDuplicates);
        assert_eq!(exit_code_for(&report_with(1, 0)), ExitCode::Success);
        assert_eq!(exit_code_for(&report_with(1, 1)), ExitCode::PartialSuccess);
    }
}

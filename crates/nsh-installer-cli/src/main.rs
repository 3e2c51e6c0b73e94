//! nsh installer CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use nsh_installer::{InstallError, SystemPrivilege};
use nsh_installer_cli::cli::{Cli, LogFormatArg, LogLevelArg};
use nsh_installer_cli::commands::{
    build_installer, ensure_elevated, load_settings, run_install,
};
use nsh_installer_cli::logging::{LogConfig, LogFormat, init_logging};
use nsh_installer_cli::summary::{print_plan, print_report};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if !cli.dry_run
        && let Err(error) = ensure_elevated(&SystemPrivilege)
    {
        report_error(&error);
        return ExitCode::FAILURE;
    }

    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("> Error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_error(&error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref(), cli.project_dir.as_deref())?;
    let installer = build_installer(&settings)?;

    if cli.dry_run {
        print_plan(installer.plan(), io::stdout().is_terminal());
        return Ok(());
    }

    let report = run_install(&installer)?;
    print_report(&report);
    Ok(())
}

fn report_error(error: &anyhow::Error) {
    tracing::debug!("Installation failed: {error:#}");
    match error.downcast_ref::<InstallError>() {
        Some(install_error) => {
            eprintln!("> Error: {}", install_error.user_message());
            eprintln!(">   {error:#}");
            if let Some(hint) = install_error.hint() {
                eprintln!("> {hint}");
            }
        }
        None => eprintln!("> Error: {error:#}"),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

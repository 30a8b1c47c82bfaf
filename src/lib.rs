// FolderIcon - Folder Icon Updater
// Assigns and refreshes custom folder icons through desktop.ini

pub mod ehm;
pub mod environment_provider;
pub mod path_resolver;
pub mod icon_resource;
pub mod config_file;
pub mod attributes;
pub mod platform;
pub mod assign;
pub mod config;
pub mod command_line;
pub mod usage;
pub mod logging;

use std::io::{self, Write};
use std::path::Path;

use tracing::warn;

use assign::IconAssignmentService;
use command_line::CommandLine;
use config::Config;
use ehm::{exit_codes, AppError};
use environment_provider::{EnvironmentProvider, ProcessEnvironment};
use platform::{ConsolePrompter, SystemAttributes, SystemShell};

/// Main entry point for the library.
/// Called by main.rs; returns the process exit code, or the error that
/// ended the run.
pub fn run() -> Result<i32, AppError> {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let cwd      = std::env::current_dir()?;
    let env      = ProcessEnvironment;
    let service  = IconAssignmentService::new(&SystemAttributes, &SystemShell, &ConsolePrompter, &env);

    run_with(&args, &cwd, &env, &service, &mut io::stdout())
}

/// Everything `run` does, with the process state passed in.
pub fn run_with(
    args:    &[String],
    cwd:     &Path,
    env:     &dyn EnvironmentProvider,
    service: &IconAssignmentService<'_>,
    out:     &mut dyn Write,
) -> Result<i32, AppError> {
    let config = Config::load(env);

    if args.is_empty() {
        usage::display_usage(out, '/')?;
        return Ok(exit_codes::FAILURE);
    }

    let cmd = match CommandLine::parse_from(args) {
        Ok(cmd) => cmd,
        Err(e)  => {
            usage::display_usage(out, guess_prefix(args))?;
            return Err(e);
        }
    };

    if cmd.show_help {
        usage::display_usage(out, cmd.switch_prefix)?;
        return Ok(exit_codes::SUCCESS);
    }

    logging::init(cmd.verbose || config.verbose, config.log_level.as_deref());

    for error in &config.errors {
        warn!(entry = %error.entry, "{} in {}", error.message, config::FOLDERICON_ENV_VAR_NAME);
    }

    let request = match cmd.to_request(&config, cwd) {
        Ok(request) => request,
        Err(e)      => {
            usage::display_usage(out, cmd.switch_prefix)?;
            return Err(e);
        }
    };

    let outcome = service.assign(&request)?;

    writeln!(out, "Folder icon updated for {}: {}", request.folder.display(), outcome.reference)?;

    Ok(outcome.exit_code())
}

/// Prefix of the first switch-looking argument, for usage after a parse
/// error.
fn guess_prefix(args: &[String]) -> char {
    match args.iter().find_map(|a| a.chars().next().filter(|c| *c == '/' || *c == '-')) {
        Some(prefix) => prefix,
        None         => '/',
    }
}

// platform/mod.rs — External collaborators
//
// The core only talks to the OS through these traits: attribute bits,
// the shell's folder-icon refresh, and the interactive index prompt.
// `win32` carries the real Win32 implementation; `fallback` keeps the
// crate usable (and testable) on other hosts.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::ehm::AppError;
use crate::icon_resource::IconReference;

#[cfg(windows)]
mod win32;

#[cfg(not(windows))]
mod fallback;

#[cfg(test)]
pub mod mock;

#[cfg(windows)]
pub use self::win32::{ansi_path, ansi_text, narrow_path_bytes, SystemAttributes, SystemShell};

#[cfg(not(windows))]
pub use self::fallback::{ansi_path, ansi_text, narrow_path_bytes, SystemAttributes, SystemShell};





/// Program launched to rebuild the icon cache when the shell refresh fails.
pub const ICON_CACHE_REFRESHER: &str = "ie4uinit.exe";
pub const ICON_CACHE_REFRESHER_ARGS: &[&str] = &["-show"];





/// OS attribute primitives (GetFileAttributes / SetFileAttributes).
pub trait FileAttributes {
    /// Current bits; `AttributeRead` when the path does not exist.
    fn get_attributes(&self, path: &Path) -> Result<u32, AppError>;

    /// Replace the bits; `AttributeWrite` when the OS rejects it.
    fn set_attributes(&self, path: &Path, bits: u32) -> Result<(), AppError>;
}





/// Shell-side folder customization.
pub trait ShellNotifier {
    /// Sets the folder's custom icon and notifies the shell of the change.
    fn refresh_folder_icon(&self, folder: &Path, icon: &IconReference) -> Result<(), AppError>;

    ////////////////////////////////////////////////////////////////////////////
    //
    //  launch_fallback_refresh
    //
    //  Starts the icon cache refresher without waiting for it.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn launch_fallback_refresh(&self) -> Result<(), AppError> {
        spawn_detached(ICON_CACHE_REFRESHER, ICON_CACHE_REFRESHER_ARGS)
    }
}





/// Interactive fallback for a .dll source given without an index.
pub trait IndexPrompter {
    fn prompt_for_index(&self, source: &Path) -> Result<i32, AppError>;
}





////////////////////////////////////////////////////////////////////////////////
//
//  spawn_detached
//
//  Launches `program` with no inherited stdio.  Only a failure to start the
//  process is an error; its exit status is not awaited.
//
////////////////////////////////////////////////////////////////////////////////

pub fn spawn_detached(program: &str, args: &[&str]) -> Result<(), AppError> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| AppError::FallbackLaunchFailed { program: program.to_string(), source })?;

    info!(program, "launched icon cache refresh");
    Ok(())
}





/// Prompts on stdout and reads the answer from stdin.
pub struct ConsolePrompter;





impl IndexPrompter for ConsolePrompter {
    fn prompt_for_index(&self, source: &Path) -> Result<i32, AppError> {
        let stdin  = io::stdin();
        let stdout = io::stdout();

        read_index(source, &mut stdin.lock(), &mut stdout.lock())
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  read_index
//
//  Asks for an icon index until a line parses as an integer.  End of input
//  before a valid answer is InvalidArg.
//
////////////////////////////////////////////////////////////////////////////////

pub fn read_index(source: &Path, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<i32, AppError> {
    loop {
        write!(output, "Enter the icon index to use from {}: ", source.display())?;
        output.flush()?;

        let mut line = String::new();

        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Err(AppError::InvalidArg(format!(
                "Error:   no icon index entered for {}",
                source.display()
            )));
        }

        let answer = line.trim();

        match answer.parse::<i32>() {
            Ok(index) => return Ok(index),
            Err(_)    => writeln!(output, "'{}' is not a valid icon index.", answer)?,
        }
    }
}

// ehm.rs — Error handling module
//
// Every failure path of the tool maps to one AppError variant, so callers
// can report a distinguishable reason and pick the process exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;





/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS:                 i32 = 0;
    pub const FAILURE:                 i32 = 1;
    pub const UNRECOGNIZED_ARGUMENT:   i32 = 2;
    pub const FALLBACK_LAUNCH_FAILURE: i32 = 3;
}





/// Why an icon source (or the entry naming it) failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconProblem {
    /// The resolved path does not exist on disk.
    Missing,

    /// The extension is not one of the supported icon source kinds.
    UnsupportedType(String),

    /// The IconResource value was empty or could not be read as a path.
    Malformed,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl fmt::Display for IconProblem
//
//  Short human-readable reason, appended to the owning error message.
//
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for IconProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconProblem::Missing => write!(f, "file does not exist"),
            IconProblem::UnsupportedType(ext) if ext.is_empty() => {
                write!(f, "file has no extension (expected .ico or .dll)")
            }
            IconProblem::UnsupportedType(ext) => {
                write!(f, "unsupported icon type '{}' (expected .ico or .dll)", ext)
            }
            IconProblem::Malformed => write!(f, "malformed IconResource entry"),
        }
    }
}





/// Unified error type for the folder icon tool.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard I/O error (Win32 failures arrive here as well)
    #[error("{0}")]
    Io(#[from] io::Error),

    /// Missing or invalid switch value (usage display + exit 1)
    #[error("{0}")]
    InvalidArg(String),

    /// Unknown switch or stray positional argument (exit 2)
    #[error("Error:   unrecognized argument '{0}'")]
    UnrecognizedArg(String),

    /// Target folder does not exist or is not a directory
    #[error("Error:   {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    /// desktop.ini is absent from the folder
    #[error("Error:   desktop.ini not found in folder: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Refresh-only run on a folder without a usable IconResource entry
    #[error("Error:   no valid IconResource configured for {}{}", .folder.display(), problem_suffix(.problem))]
    NoIconConfigured {
        folder:  PathBuf,
        problem: Option<IconProblem>,
    },

    /// Icon source missing or of an unsupported type
    #[error("Error:   invalid icon file {}: {problem}", .path.display())]
    InvalidIconFile {
        path:    PathBuf,
        problem: IconProblem,
    },

    /// Attribute bits could not be read
    #[error("Failed to read attributes for {}: {source}", .path.display())]
    AttributeRead {
        path:   PathBuf,
        source: io::Error,
    },

    /// Attribute bits could not be written
    #[error("Failed to set attributes for {}: {source}", .path.display())]
    AttributeWrite {
        path:   PathBuf,
        source: io::Error,
    },

    /// The shell rejected the folder customization
    #[error("Failed to update folder icon for {}, HRESULT: {}", .folder.display(), hresult_hex(.code))]
    ShellRefreshFailed {
        folder: PathBuf,
        code:   i32,
    },

    /// The icon cache refresher could not be started
    #[error("Failed to launch {program}: {source}")]
    FallbackLaunchFailed {
        program: String,
        source:  io::Error,
    },
}





////////////////////////////////////////////////////////////////////////////////
//
//  problem_suffix
//
//  Formats an optional validation reason as ": <reason>", or nothing.
//
////////////////////////////////////////////////////////////////////////////////

fn problem_suffix(problem: &Option<IconProblem>) -> String {
    match problem {
        Some(p) => format!(": {}", p),
        None    => String::new(),
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  hresult_hex
//
//  HRESULTs read best as unsigned hex (0x80070005, not -2147024891).
//
////////////////////////////////////////////////////////////////////////////////

fn hresult_hex(code: &i32) -> String {
    format!("0x{:08X}", *code as u32)
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl AppError
//
//  Exit-code mapping.
//
////////////////////////////////////////////////////////////////////////////////

impl AppError {
    ////////////////////////////////////////////////////////////////////////////
    //
    //  exit_code
    //
    //  Process exit code to use when this error ends the run.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::UnrecognizedArg(_)           => exit_codes::UNRECOGNIZED_ARGUMENT,
            AppError::FallbackLaunchFailed { .. }  => exit_codes::FALLBACK_LAUNCH_FAILURE,
            _                                      => exit_codes::FAILURE,
        }
    }
}

// command_line.rs — CLI argument parsing (custom, no clap)
//
// Windows-style /switch and -switch prefixes, case-insensitive:
//   /f <folder>  /i <icon>  /n <index>  /a [<attrSpec>...]  /v  /?

use std::path::{Path, PathBuf};

use crate::assign::AssignRequest;
use crate::attributes::AttributeSpec;
use crate::config::Config;
use crate::ehm::AppError;
use crate::path_resolver::{normalize_lexically, trim_quotes};

// ── CommandLine struct ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CommandLine {
    pub folder:         Option<PathBuf>,
    pub icon:           Option<PathBuf>,
    pub index:          Option<i32>,
    /// `Some(None)` is a bare `/a` (use the configured default overlay).
    pub attributes:     Option<Option<AttributeSpec>>,
    pub verbose:        bool,
    pub show_help:      bool,
    pub switch_prefix:  char,
}

impl Default for CommandLine {
    fn default() -> Self {
        CommandLine {
            folder:         None,
            icon:           None,
            index:          None,
            attributes:     None,
            verbose:        false,
            show_help:      false,
            switch_prefix:  '/',
        }
    }
}

impl CommandLine {
    /// Parse command-line arguments into a CommandLine struct.
    /// Args should NOT include argv[0] (program name).
    pub fn parse_from<I, S>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cmd  = CommandLine::default();
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            if arg.is_empty() {
                continue;
            }

            let mut chars = arg.chars();
            let prefix    = chars.next().unwrap_or_default();
            let name      = chars.as_str();

            if (prefix != '/' && prefix != '-') || name.chars().count() != 1 {
                return Err(AppError::UnrecognizedArg(arg.clone()));
            }

            cmd.switch_prefix = prefix;

            match name.to_ascii_lowercase().as_str() {
                "f" => cmd.folder = Some(clean_path_arg(take_value(arg, iter.next())?)),
                "i" => cmd.icon   = Some(clean_path_arg(take_value(arg, iter.next())?)),
                "n" => cmd.index  = Some(parse_index(take_value(arg, iter.next())?)?),
                "v" => cmd.verbose   = true,
                "?" => cmd.show_help = true,
                "a" => {
                    // Consume every following argument that reads as attribute tokens
                    let mut tokens: Vec<&str> = Vec::new();

                    while let Some(next) = iter.next_if(|next| AttributeSpec::parse(next).is_ok()) {
                        tokens.push(next);
                    }

                    cmd.attributes = if tokens.is_empty() {
                        Some(None)
                    } else {
                        Some(Some(AttributeSpec::parse(&tokens.join(" "))?))
                    };
                }
                _ => return Err(AppError::UnrecognizedArg(arg.clone())),
            }
        }

        Ok(cmd)
    }

    /// Check switch combinations that parse fine on their own.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.show_help {
            return Ok(());
        }

        if self.folder.is_none() {
            return Err(AppError::InvalidArg(format!(
                "Error:   {}f <folder> is required",
                self.switch_prefix
            )));
        }

        if self.index.is_some() && self.icon.is_none() {
            return Err(AppError::InvalidArg(format!(
                "Error:   {p}n requires {p}i",
                p = self.switch_prefix
            )));
        }

        Ok(())
    }

    /// Build the service request.  Relative paths are made absolute
    /// against `cwd` here; nothing past this point looks at the working
    /// directory.
    pub fn to_request(&self, config: &Config, cwd: &Path) -> Result<AssignRequest, AppError> {
        self.validate()?;

        let folder = self.folder.as_deref().ok_or_else(|| AppError::InvalidArg(String::new()))?;

        let attributes = match self.attributes {
            None             => None,
            Some(None)       => Some(config.default_attributes),
            Some(Some(spec)) => Some(spec),
        };

        Ok(AssignRequest {
            folder: absolutize(cwd, folder),
            icon:   self.icon.as_deref().map(|icon| absolutize(cwd, icon)),
            index:  self.index,
            attributes,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn take_value<'a>(switch: &str, value: Option<&'a String>) -> Result<&'a str, AppError> {
    value
        .map(String::as_str)
        .ok_or_else(|| AppError::InvalidArg(format!("Error:   {} requires a value", switch)))
}

fn parse_index(text: &str) -> Result<i32, AppError> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| AppError::InvalidArg(format!("Error:   invalid icon index '{}'", text)))
}

/// Strips surrounding quotes, plus the stray trailing quote cmd.exe leaves
/// behind for `"C:\dir\"`.
fn clean_path_arg(value: &str) -> PathBuf {
    let trimmed = trim_quotes(value.trim());
    PathBuf::from(trimmed.strip_suffix('"').unwrap_or(trimmed))
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize_lexically(&cwd.join(path))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

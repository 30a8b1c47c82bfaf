// config.rs — FOLDERICON environment variable defaults
//
// Format: semicolon-separated entries, keys case-insensitive.
//
//   A=<attrSpec>   overlay used when /a is given without a value
//   Log=<level>    error | warn | info | debug | trace
//   V              verbose logging (same as /v)
//
// Bad entries are collected in `errors` and reported as warnings; they
// never stop a run.

use crate::attributes::{AttributeSpec, DEFAULT_ATTRIBUTE_SPEC};
use crate::environment_provider::EnvironmentProvider;





/// Environment variable name
pub const FOLDERICON_ENV_VAR_NAME: &str = "FOLDERICON";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];





/// One rejected FOLDERICON entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub entry:   String,
}





/// Defaults layered under the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_attributes: AttributeSpec,
    pub verbose:            bool,
    pub log_level:          Option<String>,
    pub errors:             Vec<ErrorInfo>,
}





impl Default for Config {
    fn default() -> Self {
        Config {
            default_attributes: builtin_default_attributes(),
            verbose:            false,
            log_level:          None,
            errors:             Vec::new(),
        }
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  builtin_default_attributes
//
//  "+H -S" as a parsed spec.
//
////////////////////////////////////////////////////////////////////////////////

fn builtin_default_attributes() -> AttributeSpec {
    AttributeSpec::parse(DEFAULT_ATTRIBUTE_SPEC).unwrap_or_default()
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Config
//
//  Loading and per-entry parsing.
//
////////////////////////////////////////////////////////////////////////////////

impl Config {
    ////////////////////////////////////////////////////////////////////////////
    //
    //  load
    //
    //  Built-in defaults overridden by FOLDERICON, when set.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn load(provider: &dyn EnvironmentProvider) -> Config {
        let mut config = Config::default();

        if let Some(value) = provider.get_env_var(FOLDERICON_ENV_VAR_NAME) {
            for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
                config.process_entry(entry);
            }
        }

        config
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  process_entry
    //
    //  Applies one trimmed, non-empty entry.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn process_entry(&mut self, entry: &str) {
        if entry.starts_with('/') || entry.starts_with('-') {
            self.push_error("Switch prefixes (/, -) are not allowed in env var", entry);
            return;
        }

        let Some((key, value)) = entry.split_once('=') else {
            if entry.eq_ignore_ascii_case("v") {
                self.verbose = true;
            } else {
                self.push_error("Unknown switch (expected V)", entry);
            }
            return;
        };

        let key   = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("a") {
            match AttributeSpec::parse(value) {
                Ok(spec) => self.default_attributes = spec,
                Err(_)   => self.push_error("Invalid attribute specification (expected tokens like +H -S)", entry),
            }
        } else if key.eq_ignore_ascii_case("log") {
            let level = value.to_ascii_lowercase();

            if LOG_LEVELS.contains(&level.as_str()) {
                self.log_level = Some(level);
            } else {
                self.push_error("Invalid log level (expected error, warn, info, debug or trace)", entry);
            }
        } else {
            self.push_error("Unknown key (expected A or Log)", entry);
        }
    }





    fn push_error(&mut self, message: &str, entry: &str) {
        self.errors.push(ErrorInfo { message: message.into(), entry: entry.into() });
    }
}

// usage.rs — Help screen

use std::io::{self, Write};

use crate::attributes::DEFAULT_ATTRIBUTE_SPEC;
use crate::config::FOLDERICON_ENV_VAR_NAME;
use crate::config_file::CONFIG_FILE_NAME;





////////////////////////////////////////////////////////////////////////////////

pub const VERSION_STRING:    &str = env!("FOLDERICON_VERSION_STRING");
pub const VERSION_YEAR:      &str = env!("FOLDERICON_VERSION_YEAR");
pub const BUILD_TIMESTAMP:   &str = env!("FOLDERICON_BUILD_TIMESTAMP");

pub const COPYRIGHT: char = '\u{00A9}';  // ©





////////////////////////////////////////////////////////////////////////////////
//
//  architecture
//
//  Returns the current CPU architecture as a display string.
//
////////////////////////////////////////////////////////////////////////////////

fn architecture() -> &'static str {
    if cfg!(target_arch = "x86_64") {
        "x64"
    } else if cfg!(target_arch = "aarch64") {
        "ARM64"
    } else if cfg!(target_arch = "x86") {
        "x86"
    } else {
        "unknown"
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  display_usage
//
//  Writes the help screen, using the switch prefix the user typed.
//
////////////////////////////////////////////////////////////////////////////////

pub fn display_usage(out: &mut dyn Write, prefix: char) -> io::Result<()> {
    let p = if prefix == '-' { '-' } else { '/' };

    // Source indentation = output indentation.
    write!(out, "\
Folder Icon Updater version {ver} {arch} ({ts})
Copyright {copy} 2024-{year} by Robert Elmer

FOLDERICON {p}F folder [{p}I icon [{p}N index]] [{p}A [attributes]] [{p}V]

  {p}F folder     Folder whose icon is assigned or refreshed.
  {p}I icon       .ico file or .dll containing icon resources.  Without {p}I,
               the icon already listed in the folder's {ini} is
               re-applied.
  {p}N index      Zero-based icon index within the source.  Requires {p}I.
               Defaults to 0 for .ico; prompted for when a .dll is given
               without it.
  {p}A attributes Sets or clears attributes on {ini} and the icon file.
               Tokens: +H -H +S -S +R -R (default \"{attr}\").  Without {p}A,
               the attributes of {ini} are left as they were.
  {p}V            Verbose logging to stderr.
  {p}?            Displays this help.

  Defaults may be set in the {env} environment variable:
               {env}=A=+H +S;Log=info;V

Exit codes: 0 success, 1 failure, 2 unrecognized argument,
            3 icon cache refresher could not be started.
",
        ver  = VERSION_STRING,
        arch = architecture(),
        ts   = BUILD_TIMESTAMP,
        copy = COPYRIGHT,
        year = VERSION_YEAR,
        ini  = CONFIG_FILE_NAME,
        attr = DEFAULT_ATTRIBUTE_SPEC,
        env  = FOLDERICON_ENV_VAR_NAME,
    )?;

    out.flush()
}

// build.rs — Inject version + build timestamp.
//
// On every compile:
// 1. Reads Version.toml (major, minor, build)
// 2. Emits cargo:rustc-env directives so src/ can use env!() macros
//
// Env vars injected:
//   FOLDERICON_VERSION_STRING  e.g. "1.2.0"
//   FOLDERICON_VERSION_YEAR    e.g. "2026"
//   FOLDERICON_BUILD_TIMESTAMP e.g. "Feb  9 2026 14:30"

use std::fs;
use std::path::Path;
use chrono::Local;





////////////////////////////////////////////////////////////////////////////////

struct Version {
    major: u32,
    minor: u32,
    build: u32,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Display for Version
//
//  Formats the version as "major.minor.build".
//
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  read_version
//
//  Reads major, minor, and build numbers from Version.toml.  A missing file
//  yields 0.0.0 so a packaged source tree without it still builds.
//
////////////////////////////////////////////////////////////////////////////////

fn read_version(path: &Path) -> Version {
    let contents = fs::read_to_string(path).unwrap_or_default();
    let mut major: u32 = 0;
    let mut minor: u32 = 0;
    let mut build: u32 = 0;



    for line in contents.lines() {
        let line = line.trim();

        if line.starts_with('#') || line.is_empty() {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let val = value.trim();

            match key.trim() {
                "major" => major = val.parse().unwrap_or(0),
                "minor" => minor = val.parse().unwrap_or(0),
                "build" => build = val.parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    Version { major, minor, build }
}





////////////////////////////////////////////////////////////////////////////////
//
//  emit_env_vars
//
//  Emits cargo:rustc-env directives for version, timestamp, and year.
//
////////////////////////////////////////////////////////////////////////////////

fn emit_env_vars(version: &Version) {
    let now = Local::now();

    println!("cargo:rustc-env=FOLDERICON_VERSION_STRING={version}");
    println!("cargo:rustc-env=FOLDERICON_VERSION_YEAR={}", now.format("%Y"));
    println!("cargo:rustc-env=FOLDERICON_BUILD_TIMESTAMP={}", now.format("%b %e %Y %H:%M"));
}





fn main() {
    let version_path = Path::new("Version.toml");
    let version      = read_version(version_path);

    println!("cargo:rerun-if-changed=Version.toml");

    emit_env_vars(&version);
}

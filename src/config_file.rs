// config_file.rs — desktop.ini read / rewrite
//
// Only the first "IconResource=" line is interpreted.  Every other line is
// opaque and survives a rewrite unchanged, terminator included.  Narrow
// (ANSI / UTF-8) files are edited as raw bytes until a non-ASCII line has to
// go in; then the whole file becomes UTF-16LE.  UTF-16LE files are decoded,
// edited and re-encoded with their BOM.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ehm::{AppError, IconProblem};
use crate::environment_provider::EnvironmentProvider;
use crate::icon_resource::{IconReference, ICON_RESOURCE_KEY};
use crate::path_resolver::{expand_env_vars, extension_of, resolve_relative, IconSourceKind};
use crate::platform::{ansi_path, ansi_text, narrow_path_bytes};





/// Fixed name of the per-folder configuration file.
pub const CONFIG_FILE_NAME: &str = "desktop.ini";

const UTF8_BOM:     &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const CRLF:         &[u8] = b"\r\n";
const LF:           &[u8] = b"\n";





/// On-disk encoding of a configuration file, detected from its BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// No BOM: ANSI or UTF-8, handled as bytes.
    Narrow,
    Utf8Bom,
    Utf16Le,
}





/// A found IconResource entry: as stored, and resolved for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// Exactly what the file says (path unexpanded, possibly relative).
    pub stored:   IconReference,

    /// Absolute, expanded path that passed validation.
    pub resolved: IconReference,
}





/// Decoded file body.  `body` is raw bytes for Narrow files and UTF-8 for
/// the other encodings; the BOM is kept out of it.
struct ConfigText {
    encoding: TextEncoding,
    body:     Vec<u8>,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl ConfigText
//
//  Encoding round-trip and the line-oriented scan / upsert.
//
////////////////////////////////////////////////////////////////////////////////

impl ConfigText {
    fn empty(encoding: TextEncoding) -> Self {
        ConfigText { encoding, body: Vec::new() }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  decode
    //
    //  Splits off the BOM.  A trailing odd byte in a UTF-16 file is dropped.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn decode(bytes: Vec<u8>) -> Self {
        if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();

            return ConfigText {
                encoding: TextEncoding::Utf16Le,
                body:     String::from_utf16_lossy(&units).into_bytes(),
            };
        }

        if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
            return ConfigText { encoding: TextEncoding::Utf8Bom, body: rest.to_vec() };
        }

        ConfigText { encoding: TextEncoding::Narrow, body: bytes }
    }





    fn encode(&self) -> Vec<u8> {
        match self.encoding {
            TextEncoding::Narrow => self.body.clone(),

            TextEncoding::Utf8Bom => [UTF8_BOM, self.body.as_slice()].concat(),

            TextEncoding::Utf16Le => {
                let text = String::from_utf8_lossy(&self.body);
                let mut out = UTF16_LE_BOM.to_vec();

                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }

                out
            }
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  widen
    //
    //  Narrow body to UTF-16LE.  Valid UTF-8 is taken as is; anything else
    //  is read in the ANSI code page.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn widen(&mut self) {
        if self.encoding != TextEncoding::Narrow {
            return;
        }

        let body = std::mem::take(&mut self.body);

        self.body = match String::from_utf8(body) {
            Ok(text) => text.into_bytes(),
            Err(e)   => ansi_text(e.as_bytes()).into_bytes(),
        };
        self.encoding = TextEncoding::Utf16Le;
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  find_entry
    //
    //  First line starting with the key, parsed.  None when no line matches.
    //  A value that is not UTF-8 is taken to be in the ANSI code page.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn find_entry(&self) -> Option<IconReference> {
        self.body
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .find_map(|line| line.strip_prefix(ICON_RESOURCE_KEY.as_bytes()))
            .map(|value| match std::str::from_utf8(value) {
                Ok(text) => IconReference::parse(text),
                Err(_)   => IconReference::parse_ansi(value, ansi_path),
            })
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  upsert_entry
    //
    //  Replaces the first key line (keeping its terminator) or appends a new
    //  line using the file's terminator style.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn upsert_entry(&mut self, line: &[u8]) {
        let mut out      = Vec::with_capacity(self.body.len() + line.len() + CRLF.len());
        let mut replaced = false;

        for existing in self.body.split_inclusive(|&b| b == b'\n') {
            if !replaced && existing.starts_with(ICON_RESOURCE_KEY.as_bytes()) {
                out.extend_from_slice(line);
                out.extend_from_slice(line_terminator(existing));
                replaced = true;
            } else {
                out.extend_from_slice(existing);
            }
        }

        if !replaced {
            let eol = dominant_terminator(&self.body);

            if !out.is_empty() && !out.ends_with(LF) {
                out.extend_from_slice(eol);
            }

            out.extend_from_slice(line);
            out.extend_from_slice(eol);
        }

        self.body = out;
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  line_terminator
//
//  The "\r\n", "\n" or empty tail of one split_inclusive line.
//
////////////////////////////////////////////////////////////////////////////////

fn line_terminator(line: &[u8]) -> &'static [u8] {
    if line.ends_with(CRLF) {
        CRLF
    } else if line.ends_with(LF) {
        LF
    } else {
        b""
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  dominant_terminator
//
//  CRLF unless the body only ever uses bare LF.
//
////////////////////////////////////////////////////////////////////////////////

fn dominant_terminator(body: &[u8]) -> &'static [u8] {
    let has_crlf = body.windows(2).any(|w| w == CRLF);
    let has_lf   = body.contains(&b'\n');

    if has_lf && !has_crlf { LF } else { CRLF }
}





////////////////////////////////////////////////////////////////////////////////
//
//  config_path
//
//  <folder>\desktop.ini
//
////////////////////////////////////////////////////////////////////////////////

pub fn config_path(folder: &Path) -> PathBuf {
    folder.join(CONFIG_FILE_NAME)
}





////////////////////////////////////////////////////////////////////////////////
//
//  validate_icon_source
//
//  Extension first (no I/O), then existence.
//
////////////////////////////////////////////////////////////////////////////////

pub fn validate_icon_source(path: &Path) -> Result<IconSourceKind, AppError> {
    let invalid = |problem| AppError::InvalidIconFile { path: path.to_path_buf(), problem };

    let kind = IconSourceKind::from_path(path)
        .ok_or_else(|| invalid(IconProblem::UnsupportedType(extension_of(path))))?;

    if !path.is_file() {
        return Err(invalid(IconProblem::Missing));
    }

    Ok(kind)
}





////////////////////////////////////////////////////////////////////////////////
//
//  read_config
//
//  Loads and decodes the folder's desktop.ini; ConfigNotFound when absent.
//
////////////////////////////////////////////////////////////////////////////////

fn read_config(folder: &Path) -> Result<(PathBuf, ConfigText), AppError> {
    let path = config_path(folder);

    match fs::read(&path) {
        Ok(bytes) => Ok((path, ConfigText::decode(bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AppError::ConfigNotFound(folder.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  read_icon_entry
//
//  Finds the entry, expands %VAR% references, resolves a relative path
//  against the configuration file's folder and validates the result.
//
//    Err(ConfigNotFound)   no desktop.ini
//    Ok(None)              no IconResource line
//    Err(InvalidIconFile)  entry present but malformed, missing or of an
//                          unsupported type
//
////////////////////////////////////////////////////////////////////////////////

pub fn read_icon_entry(folder: &Path, env: &dyn EnvironmentProvider) -> Result<Option<IconEntry>, AppError> {
    let (path, text) = read_config(folder)?;

    let Some(stored) = text.find_entry() else {
        debug!(config = %path.display(), "no IconResource line");
        return Ok(None);
    };

    if stored.is_empty() {
        return Err(AppError::InvalidIconFile { path, problem: IconProblem::Malformed });
    }

    let expanded = match stored.path.to_str() {
        Some(text) => PathBuf::from(expand_env_vars(text, env)),
        None       => stored.path.clone(),
    };
    let resolved = resolve_relative(&path, &expanded);

    debug!(
        config   = %path.display(),
        stored   = %stored,
        resolved = %resolved.display(),
        "found IconResource entry"
    );

    validate_icon_source(&resolved)?;

    Ok(Some(IconEntry { resolved: stored.with_path(&resolved), stored }))
}





////////////////////////////////////////////////////////////////////////////////
//
//  write_icon_entry
//
//  Read-modify-write of the whole file.  A missing file is created with the
//  one line.  Narrow desktop.ini files are read with the ANSI code page, so
//  a non-ASCII line turns a narrow (or new) file into UTF-16LE.  A path that
//  only exists as raw narrow bytes is written back as those bytes.
//
////////////////////////////////////////////////////////////////////////////////

pub fn write_icon_entry(folder: &Path, reference: &IconReference) -> Result<(), AppError> {
    let (path, mut text) = match read_config(folder) {
        Ok(found) => found,
        Err(AppError::ConfigNotFound(_)) => (config_path(folder), ConfigText::empty(TextEncoding::Narrow)),
        Err(e) => return Err(e),
    };

    let raw_path = narrow_path_bytes(&reference.path).filter(|_| text.encoding == TextEncoding::Narrow);

    let line = match raw_path {
        Some(path_bytes) => {
            [ICON_RESOURCE_KEY.as_bytes(), path_bytes.as_slice(), format!(",{}", reference.index).as_bytes()].concat()
        }
        None => {
            let line = reference.to_line();

            if !line.is_ascii() {
                text.widen();
            }

            line.into_bytes()
        }
    };

    text.upsert_entry(&line);

    debug!(
        config   = %path.display(),
        line     = %String::from_utf8_lossy(&line),
        encoding = ?text.encoding,
        "writing IconResource entry"
    );
    write_atomically(&path, &text.encode())
}





////////////////////////////////////////////////////////////////////////////////
//
//  write_atomically
//
//  Writes to a temp file beside the target, syncs, then renames over it.
//  The temp file is removed if any step fails.
//
////////////////////////////////////////////////////////////////////////////////

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let parent    = path.parent().unwrap_or(Path::new("."));
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

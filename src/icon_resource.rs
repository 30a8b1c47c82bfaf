// icon_resource.rs — IconResource=<path>,<index> codec
//
// The only desktop.ini key this tool understands.  Parsing never fails:
// anything unreadable degrades to an empty path, which callers treat as
// "no icon configured".

use std::fmt;
use std::path::{Path, PathBuf};

use crate::path_resolver::{trim_quotes, IconSourceKind};





/// Key prefix of the recognized line, matched case-sensitively at column 0.
pub const ICON_RESOURCE_KEY: &str = "IconResource=";





/// Parsed form of an IconResource entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconReference {
    /// Icon source path; relative entries are relative to the folder holding
    /// the configuration file.
    pub path:  PathBuf,

    /// Zero-based icon index (negative values are resource IDs).
    pub index: i32,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl IconReference
//
//  Construction, classification, and the codec entry points.
//
////////////////////////////////////////////////////////////////////////////////

impl IconReference {
    pub fn new(path: impl Into<PathBuf>, index: i32) -> Self {
        IconReference { path: path.into(), index }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  is_empty
    //
    //  True for the degraded result of parsing a malformed value.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn is_empty(&self) -> bool {
        self.path.as_os_str().is_empty()
    }





    pub fn kind(&self) -> Option<IconSourceKind> {
        IconSourceKind::from_path(&self.path)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  with_path
    //
    //  Same index, different path.  Used to carry the resolved absolute path
    //  while keeping the entry's index.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn with_path(&self, path: &Path) -> Self {
        IconReference { path: path.to_path_buf(), index: self.index }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  parse
    //
    //  Parses the text after "IconResource=".  The index is the segment
    //  after the LAST comma, and only when it reads as a signed integer;
    //  otherwise the whole value is the path and the index is 0.  The path
    //  is quote-trimmed but not resolved.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn parse(raw_value: &str) -> IconReference {
        let value = raw_value.trim();

        let (path_part, index) = match value.rsplit_once(',') {
            Some((head, tail)) => match tail.trim().parse::<i32>() {
                Ok(index) => (head, index),
                Err(_)    => (value, 0),
            },
            None => (value, 0),
        };

        IconReference {
            path:  PathBuf::from(trim_quotes(path_part.trim())),
            index,
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  parse_ansi
    //
    //  `parse` for a value that is not UTF-8 (a BOM-less file in the ANSI
    //  code page).  Splitting and trimming happen on the raw bytes; only the
    //  path bytes go through `decode_path`.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn parse_ansi(raw_value: &[u8], decode_path: impl FnOnce(&[u8]) -> PathBuf) -> IconReference {
        let value = raw_value.trim_ascii();

        let (path_part, index) = match value.iter().rposition(|&b| b == b',') {
            Some(at) => match parse_index_bytes(&value[at + 1..]) {
                Some(index) => (&value[..at], index),
                None        => (value, 0),
            },
            None => (value, 0),
        };

        let unquoted = match path_part.trim_ascii() {
            [b'"', inner @ .., b'"'] => inner,
            other                    => other,
        };

        IconReference { path: decode_path(unquoted), index }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  parse_line
    //
    //  Returns the parsed entry when `line` (without terminator) starts with
    //  the IconResource key; None for any other line.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn parse_line(line: &str) -> Option<IconReference> {
        line.strip_prefix(ICON_RESOURCE_KEY).map(IconReference::parse)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  format
    //
    //  Serializes as "<path>,<index>".  The index is always written, 0
    //  included.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn format(&self) -> String {
        format!("{},{}", self.path.display(), self.index)
    }





    pub fn to_line(&self) -> String {
        format!("{}{}", ICON_RESOURCE_KEY, self.format())
    }
}





impl fmt::Display for IconReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}





fn parse_index_bytes(bytes: &[u8]) -> Option<i32> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

// attributes.rs — Hidden/System/Read-only attribute handling
//
// AttributeSpec is the "+H -S" overlay syntax; AttributeGuard captures,
// overlays and restores attribute bits through the FileAttributes seam.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ehm::AppError;
use crate::platform::FileAttributes;

// ── File attribute constants (Win32 values) ───────────────────────────────────

pub const FILE_ATTRIBUTE_READONLY:            u32 = 0x0000_0001;
pub const FILE_ATTRIBUTE_HIDDEN:              u32 = 0x0000_0002;
pub const FILE_ATTRIBUTE_SYSTEM:              u32 = 0x0000_0004;
pub const FILE_ATTRIBUTE_DIRECTORY:           u32 = 0x0000_0010;
pub const FILE_ATTRIBUTE_ARCHIVE:             u32 = 0x0000_0020;
pub const FILE_ATTRIBUTE_NORMAL:              u32 = 0x0000_0080;
pub const FILE_ATTRIBUTE_TEMPORARY:           u32 = 0x0000_0100;
pub const FILE_ATTRIBUTE_OFFLINE:             u32 = 0x0000_1000;
pub const FILE_ATTRIBUTE_NOT_CONTENT_INDEXED: u32 = 0x0000_2000;

/// Bits SetFileAttributes accepts; everything else is read-only state.
pub const SETTABLE_ATTRIBUTES: u32 = FILE_ATTRIBUTE_READONLY
    | FILE_ATTRIBUTE_HIDDEN
    | FILE_ATTRIBUTE_SYSTEM
    | FILE_ATTRIBUTE_ARCHIVE
    | FILE_ATTRIBUTE_TEMPORARY
    | FILE_ATTRIBUTE_OFFLINE
    | FILE_ATTRIBUTE_NOT_CONTENT_INDEXED;

/// Bits that make the OS refuse to truncate or replace a file.
pub const WRITE_BLOCKING_ATTRIBUTES: u32 =
    FILE_ATTRIBUTE_READONLY | FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM;

// ── Overlay letters ───────────────────────────────────────────────────────────

/// Attribute letters accepted in an overlay, in display order.
pub const OVERLAY_ATTRIBUTE_MAP: [(u32, char); 3] = [
    (FILE_ATTRIBUTE_HIDDEN,   'H'),
    (FILE_ATTRIBUTE_SYSTEM,   'S'),
    (FILE_ATTRIBUTE_READONLY, 'R'),
];

/// Overlay used when attributes are requested without a value.
pub const DEFAULT_ATTRIBUTE_SPEC: &str = "+H -S";





/// Requested set/clear operations, applied on top of a file's current bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeSpec {
    pub set:   u32,
    pub clear: u32,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl AttributeSpec
//
//  Token parsing and overlay application.
//
////////////////////////////////////////////////////////////////////////////////

impl AttributeSpec {
    ////////////////////////////////////////////////////////////////////////////
    //
    //  parse
    //
    //  Parses "+H -S", "+h-s", "+R" ...  Each token is a sign followed by one
    //  letter from OVERLAY_ATTRIBUTE_MAP (case-insensitive); whitespace
    //  between tokens is optional.  When a letter repeats, the last token
    //  wins.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn parse(text: &str) -> Result<AttributeSpec, AppError> {
        let invalid = || AppError::InvalidArg(format!("Error:   invalid attribute specification '{}'", text));

        let mut spec  = AttributeSpec::default();
        let mut chars = text.chars().filter(|c| !c.is_whitespace());
        let mut any   = false;

        while let Some(sign) = chars.next() {
            if sign != '+' && sign != '-' {
                return Err(invalid());
            }

            let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
            let flag   = OVERLAY_ATTRIBUTE_MAP
                .iter()
                .find(|&&(_, ch)| ch == letter)
                .map(|&(flag, _)| flag)
                .ok_or_else(invalid)?;

            if sign == '+' {
                spec.set   |= flag;
                spec.clear &= !flag;
            } else {
                spec.clear |= flag;
                spec.set   &= !flag;
            }

            any = true;
        }

        if !any {
            return Err(invalid());
        }

        Ok(spec)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  apply
    //
    //  Sets and clears the requested bits; unmentioned bits pass through.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn apply(&self, bits: u32) -> u32 {
        (bits & !self.clear) | self.set
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl fmt::Display for AttributeSpec
//
//  Canonical form: set tokens first, then clear tokens, in map order.
//
////////////////////////////////////////////////////////////////////////////

impl fmt::Display for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();

        for (sign, mask) in [('+', self.set), ('-', self.clear)] {
            for &(flag, ch) in &OVERLAY_ATTRIBUTE_MAP {
                if mask & flag != 0 {
                    tokens.push(format!("{}{}", sign, ch));
                }
            }
        }

        f.write_str(&tokens.join(" "))
    }
}





/// Attribute bits captured before a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSnapshot {
    pub path: PathBuf,
    pub bits: u32,
}





/// Capture/overlay/restore of attribute bits.
pub struct AttributeGuard<'a> {
    provider: &'a dyn FileAttributes,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl AttributeGuard
//
//  Each operation is a single read and/or write; failures are returned,
//  never retried.
//
////////////////////////////////////////////////////////////////////////////////

impl<'a> AttributeGuard<'a> {
    pub fn new(provider: &'a dyn FileAttributes) -> Self {
        AttributeGuard { provider }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  capture
    //
    //  Snapshots the current bits.  A missing path is AttributeRead.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn capture(&self, path: &Path) -> Result<AttributeSnapshot, AppError> {
        let bits = self.provider.get_attributes(path)?;
        debug!(path = %path.display(), bits = format_args!("0x{:08X}", bits), "captured attributes");

        Ok(AttributeSnapshot { path: path.to_path_buf(), bits })
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  apply_overlay
    //
    //  Reads the current bits, applies `spec`, writes the result back and
    //  returns it.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn apply_overlay(&self, path: &Path, spec: &AttributeSpec) -> Result<u32, AppError> {
        let current = self.provider.get_attributes(path)?;
        let updated = spec.apply(current);

        debug!(
            path = %path.display(),
            spec = %spec,
            from = format_args!("0x{:08X}", current),
            to   = format_args!("0x{:08X}", updated),
            "applying attribute overlay"
        );

        self.provider.set_attributes(path, updated)?;
        Ok(updated)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  restore
    //
    //  Writes a captured snapshot back verbatim.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn restore(&self, snapshot: &AttributeSnapshot) -> Result<(), AppError> {
        debug!(path = %snapshot.path.display(), bits = format_args!("0x{:08X}", snapshot.bits), "restoring attributes");
        self.provider.set_attributes(&snapshot.path, snapshot.bits)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  overlay_snapshot
    //
    //  Applies `spec` on top of the captured bits rather than the current
    //  ones; used once the file has been rewritten and its live bits no
    //  longer reflect what the user had.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn overlay_snapshot(&self, snapshot: &AttributeSnapshot, spec: &AttributeSpec) -> Result<u32, AppError> {
        let updated = spec.apply(snapshot.bits);

        debug!(
            path = %snapshot.path.display(),
            spec = %spec,
            from = format_args!("0x{:08X}", snapshot.bits),
            to   = format_args!("0x{:08X}", updated),
            "applying attribute overlay to snapshot"
        );

        self.provider.set_attributes(&snapshot.path, updated)?;
        Ok(updated)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  clear_for_write
    //
    //  Drops Read-only/Hidden/System from a captured file so it can be
    //  replaced.  Returns false (and writes nothing) when none were set.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn clear_for_write(&self, snapshot: &AttributeSnapshot) -> Result<bool, AppError> {
        if snapshot.bits & WRITE_BLOCKING_ATTRIBUTES == 0 {
            return Ok(false);
        }

        self.provider.set_attributes(&snapshot.path, snapshot.bits & !WRITE_BLOCKING_ATTRIBUTES)?;
        Ok(true)
    }
}

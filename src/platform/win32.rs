// platform/win32.rs — Win32 attribute and shell primitives
//
// GetFileAttributesW / SetFileAttributesW for the attribute bits, and
// SHGetSetFolderCustomSettings + SHChangeNotify for the folder icon.

use std::ffi::{c_void, OsString};
use std::io;
use std::os::windows::ffi::OsStringExt;
use std::path::{Path, PathBuf};

use tracing::debug;
use widestring::U16CString;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Globalization::{MultiByteToWideChar, CP_ACP, MULTI_BYTE_TO_WIDE_CHAR_FLAGS};
use windows::Win32::Storage::FileSystem::{
    GetFileAttributesW, SetFileAttributesW, FILE_FLAGS_AND_ATTRIBUTES, INVALID_FILE_ATTRIBUTES,
};
use windows::Win32::UI::Shell::{
    SHChangeNotify, SHGetSetFolderCustomSettings, FCSM_ICONFILE, FCS_FORCEWRITE,
    SHCNE_UPDATEITEM, SHCNF_PATHW, SHFOLDERCUSTOMSETTINGS,
};

use crate::attributes::{FILE_ATTRIBUTE_NORMAL, SETTABLE_ATTRIBUTES};
use crate::ehm::AppError;
use crate::icon_resource::IconReference;

use super::{FileAttributes, ShellNotifier};





////////////////////////////////////////////////////////////////////////////////
//
//  to_wide
//
//  NUL-terminated UTF-16 copy of a path for the W APIs.
//
////////////////////////////////////////////////////////////////////////////////

fn to_wide(path: &Path) -> Result<U16CString, AppError> {
    U16CString::from_os_str(path.as_os_str()).map_err(|_| {
        AppError::InvalidArg(format!("Error:   path contains an embedded NUL: {}", path.display()))
    })
}





////////////////////////////////////////////////////////////////////////////////
//
//  ansi_to_wide
//
//  Converts bytes in the active ANSI code page to UTF-16.  If the
//  conversion fails each byte is widened as-is.
//
////////////////////////////////////////////////////////////////////////////////

fn ansi_to_wide(bytes: &[u8]) -> Vec<u16> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let flags = MULTI_BYTE_TO_WIDE_CHAR_FLAGS(0);
    let len   = unsafe { MultiByteToWideChar(CP_ACP, flags, bytes, None) };

    if len <= 0 {
        debug!(len = bytes.len(), "MultiByteToWideChar sizing failed; widening bytes");
        return bytes.iter().map(|&b| u16::from(b)).collect();
    }

    let mut wide = vec![0u16; len as usize];
    let written  = unsafe { MultiByteToWideChar(CP_ACP, flags, bytes, Some(&mut wide)) };

    wide.truncate(written.max(0) as usize);
    wide
}





/// Path stored in a BOM-less desktop.ini, decoded through CP_ACP.
pub fn ansi_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(OsString::from_wide(&ansi_to_wide(bytes)))
}

/// Whole BOM-less desktop.ini text, decoded through CP_ACP.
pub fn ansi_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&ansi_to_wide(bytes))
}

/// Windows paths are always Unicode; nothing is kept as narrow bytes.
pub fn narrow_path_bytes(_path: &Path) -> Option<Vec<u8>> {
    None
}





/// Attribute bits through GetFileAttributesW / SetFileAttributesW.
pub struct SystemAttributes;





impl FileAttributes for SystemAttributes {
    fn get_attributes(&self, path: &Path) -> Result<u32, AppError> {
        let wide = to_wide(path)?;
        let bits = unsafe { GetFileAttributesW(PCWSTR(wide.as_ptr())) };

        if bits == INVALID_FILE_ATTRIBUTES {
            return Err(AppError::AttributeRead {
                path:   path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }

        Ok(bits)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  set_attributes
    //
    //  Only settable bits are passed down; an empty set becomes NORMAL,
    //  which SetFileAttributesW requires to be used alone.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn set_attributes(&self, path: &Path, bits: u32) -> Result<(), AppError> {
        let wide     = to_wide(path)?;
        let settable = match bits & SETTABLE_ATTRIBUTES {
            0     => FILE_ATTRIBUTE_NORMAL,
            other => other,
        };

        unsafe { SetFileAttributesW(PCWSTR(wide.as_ptr()), FILE_FLAGS_AND_ATTRIBUTES(settable)) }
            .map_err(|e| AppError::AttributeWrite { path: path.to_path_buf(), source: e.into() })
    }
}





/// Folder customization through the shell.
pub struct SystemShell;





////////////////////////////////////////////////////////////////////////////////
//
//  impl ShellNotifier for SystemShell
//
//  Writes the icon through SHGetSetFolderCustomSettings (which also marks
//  the folder as customized), then broadcasts SHCNE_UPDATEITEM so open
//  Explorer windows repaint it.
//
////////////////////////////////////////////////////////////////////////////////

impl ShellNotifier for SystemShell {
    fn refresh_folder_icon(&self, folder: &Path, icon: &IconReference) -> Result<(), AppError> {
        let folder_wide   = to_wide(folder)?;
        let mut icon_wide = to_wide(&icon.path)?.into_vec_with_nul();

        let mut settings = SHFOLDERCUSTOMSETTINGS {
            dwSize:      std::mem::size_of::<SHFOLDERCUSTOMSETTINGS>() as u32,
            dwMask:      FCSM_ICONFILE,
            pszIconFile: PWSTR(icon_wide.as_mut_ptr()),
            cchIconFile: 0,
            iIconIndex:  icon.index,
            ..Default::default()
        };

        let result = unsafe {
            SHGetSetFolderCustomSettings(&mut settings, PCWSTR(folder_wide.as_ptr()), FCS_FORCEWRITE)
        };

        if let Err(e) = result {
            return Err(AppError::ShellRefreshFailed { folder: folder.to_path_buf(), code: e.code().0 });
        }

        unsafe {
            SHChangeNotify(
                SHCNE_UPDATEITEM,
                SHCNF_PATHW,
                Some(folder_wide.as_ptr() as *const c_void),
                None,
            );
        }

        debug!(folder = %folder.display(), icon = %icon, "shell notified");
        Ok(())
    }
}

// platform/fallback.rs — Non-Windows stand-ins
//
// Read-only maps onto the permission bits.  Hidden/System are not
// supported: they never read back as set and writes to them are dropped.
// There is no shell to notify: the refresh always reports E_NOTIMPL.
// ANSI text has no code page here; paths keep their raw bytes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::attributes::{FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_READONLY};
use crate::ehm::AppError;
use crate::icon_resource::IconReference;

use super::{FileAttributes, ShellNotifier};

const E_NOTIMPL: i32 = 0x8000_4001u32 as i32;





/// Path bytes from a BOM-less desktop.ini, used as the OS name unchanged.
#[cfg(unix)]
pub fn ansi_path(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub fn ansi_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(ansi_text(bytes))
}

/// Latin-1: each byte becomes the code point of the same value.
pub fn ansi_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Raw name bytes of a path that is not valid UTF-8, as read by `ansi_path`.
#[cfg(unix)]
pub fn narrow_path_bytes(path: &Path) -> Option<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;

    path.to_str().is_none().then(|| path.as_os_str().as_bytes().to_vec())
}

#[cfg(not(unix))]
pub fn narrow_path_bytes(_path: &Path) -> Option<Vec<u8>> {
    None
}





pub struct SystemAttributes;





impl FileAttributes for SystemAttributes {
    fn get_attributes(&self, path: &Path) -> Result<u32, AppError> {
        let metadata = fs::metadata(path)
            .map_err(|source| AppError::AttributeRead { path: path.to_path_buf(), source })?;

        let mut bits = if metadata.is_dir() { FILE_ATTRIBUTE_DIRECTORY } else { FILE_ATTRIBUTE_ARCHIVE };

        if metadata.permissions().readonly() {
            bits |= FILE_ATTRIBUTE_READONLY;
        }

        Ok(bits)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  set_attributes
    //
    //  Applies the Read-only bit; the rest has no portable home.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn set_attributes(&self, path: &Path, bits: u32) -> Result<(), AppError> {
        let write_error = |source: io::Error| AppError::AttributeWrite { path: path.to_path_buf(), source };

        let mut permissions = fs::metadata(path).map_err(write_error)?.permissions();
        let readonly        = bits & FILE_ATTRIBUTE_READONLY != 0;

        if permissions.readonly() != readonly {
            permissions.set_readonly(readonly);
            fs::set_permissions(path, permissions).map_err(write_error)?;
        }

        debug!(path = %path.display(), bits = format_args!("0x{:08X}", bits), "attributes applied (read-only bit only)");
        Ok(())
    }
}





pub struct SystemShell;





impl ShellNotifier for SystemShell {
    fn refresh_folder_icon(&self, folder: &Path, _icon: &IconReference) -> Result<(), AppError> {
        Err(AppError::ShellRefreshFailed { folder: folder.to_path_buf(), code: E_NOTIMPL })
    }
}





#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM};
    use tempfile::TempDir;

    #[test]
    fn readonly_round_trips_through_permissions() {
        let dir  = TempDir::new().unwrap();
        let file = dir.path().join("desktop.ini");
        fs::write(&file, "x").unwrap();

        let attrs = SystemAttributes;
        let start = attrs.get_attributes(&file).unwrap();
        assert_eq!(start & FILE_ATTRIBUTE_READONLY, 0);

        attrs.set_attributes(&file, start | FILE_ATTRIBUTE_READONLY).unwrap();
        assert_ne!(attrs.get_attributes(&file).unwrap() & FILE_ATTRIBUTE_READONLY, 0);

        attrs.set_attributes(&file, start).unwrap();
        assert_eq!(attrs.get_attributes(&file).unwrap() & FILE_ATTRIBUTE_READONLY, 0);
    }

    #[test]
    fn hidden_and_system_are_unsupported() {
        let dir  = TempDir::new().unwrap();
        let file = dir.path().join(".hidden.ini");
        fs::write(&file, "x").unwrap();

        let attrs = SystemAttributes;
        assert_eq!(attrs.get_attributes(&file).unwrap(), FILE_ATTRIBUTE_ARCHIVE);

        attrs.set_attributes(&file, FILE_ATTRIBUTE_ARCHIVE | FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM).unwrap();
        assert_eq!(attrs.get_attributes(&file).unwrap(), FILE_ATTRIBUTE_ARCHIVE);
    }

    #[test]
    fn ansi_text_maps_bytes_to_latin1() {
        assert_eq!(ansi_text(b"InfoTip=Caf\xE9"), "InfoTip=Caf\u{E9}");
    }

    #[cfg(unix)]
    #[test]
    fn ansi_path_keeps_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        assert_eq!(ansi_path(b"Caf\xE9.ico").as_os_str().as_bytes(), b"Caf\xE9.ico");
    }

    #[test]
    fn missing_path_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = SystemAttributes.get_attributes(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AppError::AttributeRead { .. }));
    }

    #[test]
    fn refresh_reports_not_implemented() {
        let err = SystemShell
            .refresh_folder_icon(Path::new("/tmp"), &IconReference::new("a.ico", 0))
            .unwrap_err();
        assert!(matches!(err, AppError::ShellRefreshFailed { code: E_NOTIMPL, .. }));
    }
}

// platform/mock.rs — In-memory collaborators for unit tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::attributes::FILE_ATTRIBUTE_ARCHIVE;
use crate::ehm::AppError;
use crate::icon_resource::IconReference;

use super::{FileAttributes, IndexPrompter, ShellNotifier};





/// Attribute bits kept in a map.  A path with no entry that exists on disk
/// reads as ARCHIVE; anything else reads as not found.
#[derive(Default)]
pub struct MemoryAttributes {
    bits:         RefCell<HashMap<PathBuf, u32>>,
    fail_reads:   HashSet<PathBuf>,
    fail_writes:  HashSet<PathBuf>,
    writes:       Cell<usize>,
}





impl MemoryAttributes {
    pub fn with(self, path: impl AsRef<Path>, bits: u32) -> Self {
        self.bits.borrow_mut().insert(path.as_ref().to_path_buf(), bits);
        self
    }

    pub fn failing_reads_of(mut self, path: impl AsRef<Path>) -> Self {
        self.fail_reads.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn failing_writes_to(mut self, path: impl AsRef<Path>) -> Self {
        self.fail_writes.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn bits(&self, path: &Path) -> Option<u32> {
        self.bits.borrow().get(path).copied()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}





impl FileAttributes for MemoryAttributes {
    fn get_attributes(&self, path: &Path) -> Result<u32, AppError> {
        let not_found = || AppError::AttributeRead {
            path:   path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };

        if self.fail_reads.contains(path) {
            return Err(not_found());
        }

        match self.bits(path) {
            Some(bits)                => Ok(bits),
            None if path.exists()     => Ok(FILE_ATTRIBUTE_ARCHIVE),
            None                      => Err(not_found()),
        }
    }

    fn set_attributes(&self, path: &Path, bits: u32) -> Result<(), AppError> {
        if self.fail_writes.contains(path) {
            return Err(AppError::AttributeWrite {
                path:   path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }

        self.writes.set(self.writes.get() + 1);
        self.bits.borrow_mut().insert(path.to_path_buf(), bits);
        Ok(())
    }
}





/// Records refresh calls; optionally fails them or the fallback launch.
#[derive(Default)]
pub struct RecordingShell {
    pub refreshes:       RefCell<Vec<(PathBuf, IconReference)>>,
    pub fallback_calls:  Cell<usize>,
    refresh_failure:     Option<i32>,
    fallback_fails:      bool,
}





impl RecordingShell {
    pub fn failing_refresh(mut self, code: i32) -> Self {
        self.refresh_failure = Some(code);
        self
    }

    pub fn failing_fallback(mut self) -> Self {
        self.fallback_fails = true;
        self
    }
}





impl ShellNotifier for RecordingShell {
    fn refresh_folder_icon(&self, folder: &Path, icon: &IconReference) -> Result<(), AppError> {
        self.refreshes.borrow_mut().push((folder.to_path_buf(), icon.clone()));

        match self.refresh_failure {
            Some(code) => Err(AppError::ShellRefreshFailed { folder: folder.to_path_buf(), code }),
            None       => Ok(()),
        }
    }

    fn launch_fallback_refresh(&self) -> Result<(), AppError> {
        self.fallback_calls.set(self.fallback_calls.get() + 1);

        if self.fallback_fails {
            return Err(AppError::FallbackLaunchFailed {
                program: super::ICON_CACHE_REFRESHER.to_string(),
                source:  io::Error::from(io::ErrorKind::NotFound),
            });
        }

        Ok(())
    }
}





/// Answers every prompt with a fixed index and counts the calls.
pub struct ScriptedPrompter {
    answer:    i32,
    pub calls: Cell<usize>,
}





impl ScriptedPrompter {
    pub fn answering(answer: i32) -> Self {
        ScriptedPrompter { answer, calls: Cell::new(0) }
    }
}





impl IndexPrompter for ScriptedPrompter {
    fn prompt_for_index(&self, _source: &Path) -> Result<i32, AppError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.answer)
    }
}

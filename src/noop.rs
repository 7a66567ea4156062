//! A filesystem with nothing in it.

use std::path::Path;
use std::time::SystemTime;

use crate::{FileInfo, FsError, FsFile, FsRead, FsWrite, OpenFlags, Permissions};

/// Empty, read-only filesystem.
///
/// Every lookup is [`FsError::NotFound`] and every mutation is
/// [`FsError::PermissionDenied`]. Composite constructors return it for an
/// empty layer list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFs;

fn denied(path: &Path, operation: &'static str) -> FsError {
    FsError::PermissionDenied {
        path: path.to_path_buf(),
        operation,
    }
}

impl FsRead for NoOpFs {
    fn name(&self) -> &str {
        "NoOpFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        Err(FsError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        Err(FsError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

impl FsWrite for NoOpFs {
    fn write(&self, path: &Path, _data: &[u8]) -> Result<(), FsError> {
        Err(denied(path, "write"))
    }

    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        if flags.mutates() {
            return Err(denied(path, "open_file"));
        }
        self.open(path)
    }

    fn chmod(&self, path: &Path, _perm: Permissions) -> Result<(), FsError> {
        Err(denied(path, "chmod"))
    }

    fn chtimes(&self, path: &Path, _: SystemTime, _: SystemTime) -> Result<(), FsError> {
        Err(denied(path, "chtimes"))
    }

    fn create_dir(&self, path: &Path, _perm: Permissions) -> Result<(), FsError> {
        Err(denied(path, "create_dir"))
    }

    fn create_dir_all(&self, path: &Path, _perm: Permissions) -> Result<(), FsError> {
        Err(denied(path, "create_dir_all"))
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        Err(denied(path, "remove"))
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        Err(denied(path, "remove_all"))
    }

    fn rename(&self, from: &Path, _to: &Path) -> Result<(), FsError> {
        Err(denied(from, "rename"))
    }
}

//! Write operations for virtual filesystems.

use std::path::Path;
use std::time::SystemTime;

use crate::{FsError, FsFile, OpenFlags, Permissions};

/// Write operations for a virtual filesystem.
///
/// The composite and [`NoOpFs`](crate::NoOpFs) implement every method by
/// returning [`FsError::PermissionDenied`]. Decorators forward to the
/// filesystem they wrap.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
pub trait FsWrite: Send + Sync {
    /// Write data to a file (creates if not exists, truncates if exists).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if parent directory does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Open a file with explicit flags.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist and `create` is unset
    /// - [`FsError::PermissionDenied`] if the flags would mutate a read-only filesystem
    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError>;

    /// Change permissions.
    fn chmod(&self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Change access and modification times.
    fn chtimes(&self, path: &Path, accessed: SystemTime, modified: SystemTime)
    -> Result<(), FsError>;

    /// Create a directory (parent must exist).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if parent directory does not exist
    /// - [`FsError::AlreadyExists`] if the path already exists
    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Create a directory and all parent directories.
    ///
    /// This is idempotent - succeeds if the directory already exists.
    fn create_dir_all(&self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Remove a file or an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::DirectoryNotEmpty`] if the directory is not empty
    fn remove(&self, path: &Path) -> Result<(), FsError>;

    /// Remove a path and everything below it. Missing paths are not an error.
    fn remove_all(&self, path: &Path) -> Result<(), FsError>;

    /// Rename/move a file or directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the source path does not exist
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_write_is_object_safe() {
        fn _check(_: &dyn FsWrite) {}
    }
}

//! Read operations for virtual filesystems.

use std::path::{Path, PathBuf};

use crate::{FileInfo, FsError, FsFile};

/// Read operations for a virtual filesystem.
///
/// This is the minimal capability set the composite consumes from every layer
/// and exposes to its callers: `stat` and `open`, where an opened directory
/// can list its entries through [`FsFile::read_dir`].
///
/// # Optional capabilities
///
/// [`lstat_if_possible`](Self::lstat_if_possible) and
/// [`real_path`](Self::real_path) have default implementations. Backends that
/// cannot do better keep them: `lstat_if_possible` falls back to `stat`, and
/// `real_path` reports [`FsError::NotSupported`].
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access. Backends should use interior mutability for their state.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
pub trait FsRead: Send + Sync {
    /// Identifying label for diagnostics.
    fn name(&self) -> &str;

    /// Get the descriptor for a path (follows symlinks).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn stat(&self, path: &Path) -> Result<FileInfo, FsError>;

    /// Get the descriptor for a path without following symlinks, if the
    /// backend can.
    ///
    /// The boolean reports whether an `lstat` was actually performed.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn lstat_if_possible(&self, path: &Path) -> Result<(FileInfo, bool), FsError> {
        Ok((self.stat(path)?, false))
    }

    /// Open a file or directory for reading.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError>;

    /// Resolve the real path of `path` on the backing storage.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the backend has no notion of a real path
    fn real_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "real_path",
        })
    }
}

//! Open file and directory handles.

use std::io::{Read, Seek};
use std::path::Path;

use crate::{FileInfo, FsError};

/// A handle returned by [`FsRead::open`](crate::FsRead::open).
///
/// File handles read bytes through [`Read`]/[`Seek`]. Directory handles list
/// their children through [`read_dir`](Self::read_dir); calling `read` or
/// `seek` on them fails with [`std::io::ErrorKind::Unsupported`].
///
/// Closing is dropping the handle.
///
/// # Object Safety
///
/// This trait is object-safe and is normally used as `Box<dyn FsFile>`.
pub trait FsFile: Read + Seek + Send {
    /// The name this handle was opened with.
    fn name(&self) -> &Path;

    /// Descriptor of the opened entry.
    fn stat(&self) -> Result<FileInfo, FsError>;

    /// Read directory entries.
    ///
    /// With `count > 0` at most `count` entries are returned and subsequent
    /// calls continue where the previous one stopped. With `count <= 0` all
    /// remaining entries are returned.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if the handle is a file
    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>, FsError>;

    /// Like [`read_dir`](Self::read_dir) but returns names only.
    fn read_dir_names(&mut self, count: isize) -> Result<Vec<String>, FsError> {
        Ok(self.read_dir(count)?.into_iter().map(|fi| fi.name).collect())
    }
}

//! Filesystem confined below a base directory of another filesystem.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::normalize;
use crate::{FileInfo, Fs, FsError, FsFile, FsRead, FsWrite, OpenFlags, Permissions};

/// Restricts an inner filesystem to the subtree below `base`.
///
/// Every name is normalized and joined onto `base`; names that climb above
/// the base are reported as [`FsError::NotFound`]. Handles report their name
/// relative to the base, and [`real_path`](FsRead::real_path) returns the
/// joined path.
///
/// ```rust
/// use anyfs_composite::{BasePathFs, Fs, FsExt, FsRead, MemoryFs};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let inner: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("site/content/a.md", "a"));
/// let fs = BasePathFs::new(inner, "site");
/// assert!(fs.is_file(Path::new("content/a.md")).unwrap());
/// assert_eq!(fs.real_path(Path::new("content")).unwrap(), Path::new("site/content"));
/// assert!(fs.stat(Path::new("../outside")).unwrap_err().is_not_found());
/// ```
pub struct BasePathFs {
    inner: Arc<dyn Fs>,
    base: PathBuf,
}

impl BasePathFs {
    /// Confine `inner` below `base`.
    pub fn new(inner: Arc<dyn Fs>, base: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            base: base.into(),
        }
    }

    /// The base directory on the inner filesystem.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, name: &Path) -> Result<PathBuf, FsError> {
        let relative = normalize(name).ok_or_else(|| FsError::NotFound {
            path: name.to_path_buf(),
        })?;
        if relative.as_os_str().is_empty() {
            Ok(self.base.clone())
        } else {
            Ok(self.base.join(relative))
        }
    }
}

impl std::fmt::Debug for BasePathFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePathFs")
            .field("inner", &self.inner.name())
            .field("base", &self.base)
            .finish()
    }
}

/// Handle that reports its name relative to the base.
struct BasePathFile {
    file: Box<dyn FsFile>,
    name: PathBuf,
}

impl Read for BasePathFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for BasePathFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl FsFile for BasePathFile {
    fn name(&self) -> &Path {
        &self.name
    }

    fn stat(&self) -> Result<FileInfo, FsError> {
        self.file.stat()
    }

    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>, FsError> {
        self.file.read_dir(count)
    }
}

impl FsRead for BasePathFs {
    fn name(&self) -> &str {
        "BasePathFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        self.inner.stat(&self.resolve(path)?)
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(FileInfo, bool), FsError> {
        self.inner.lstat_if_possible(&self.resolve(path)?)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        let file = self.inner.open(&self.resolve(path)?)?;
        Ok(Box::new(BasePathFile {
            file,
            name: path.to_path_buf(),
        }))
    }

    fn real_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        self.resolve(path)
    }
}

impl FsWrite for BasePathFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.write(&self.resolve(path)?, data)
    }

    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        let file = self.inner.open_file(&self.resolve(path)?, flags)?;
        Ok(Box::new(BasePathFile {
            file,
            name: path.to_path_buf(),
        }))
    }

    fn chmod(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.chmod(&self.resolve(path)?, perm)
    }

    fn chtimes(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        self.inner.chtimes(&self.resolve(path)?, accessed, modified)
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.create_dir(&self.resolve(path)?, perm)
    }

    fn create_dir_all(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.create_dir_all(&self.resolve(path)?, perm)
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove(&self.resolve(path)?)
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_all(&self.resolve(path)?)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.rename(&self.resolve(from)?, &self.resolve(to)?)
    }
}

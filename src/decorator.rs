//! # Decorator Filesystems
//!
//! [`DecoratorFs`] wraps a filesystem and attaches provenance to every
//! descriptor it hands out: from `stat`, from `lstat_if_possible`, and from
//! `read_dir` on the handles it opens. Mutations pass through unchanged.
//!
//! | Decoration | `filename` | `path` | opener / `fs` |
//! |------------|------------|--------|---------------|
//! | [`Filename`](Decoration::Filename) | the name looked up | unchanged | the decorator |
//! | [`BasePath`](Decoration::BasePath) | `inner.real_path(name)` | filename minus `base` | the decorator |
//! | [`Path`](Decoration::Path) | carrier's filename, else the name | filename minus `base` | the decorator |
//! | [`CompositeDir`](Decoration::CompositeDir) | unchanged | unchanged | the bound composite, directories only |
//!
//! Decorate innermost first: a `filename` already on the carrier is kept.
//!
//! ## Example
//!
//! ```rust
//! use anyfs_composite::{BasePathFs, DecoratorFs, Fs, FsRead, MemoryFs};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let mem: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("site/content/a.md", "a"));
//! let content: Arc<dyn Fs> = Arc::new(BasePathFs::new(mem, "site/content"));
//! let fs = DecoratorFs::base_path(content).unwrap();
//!
//! let meta = fs.stat(Path::new("a.md")).unwrap().meta().unwrap().clone();
//! assert_eq!(meta.filename(), Some(Path::new("site/content/a.md")));
//! assert_eq!(meta.path(), Some(Path::new("a.md")));
//! ```

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use crate::{
    FileInfo, Fs, FsError, FsFile, FsRead, FsWrite, Layer, OpenFlags, Opener, Permissions,
    decorate_file_info,
};

/// What a [`DecoratorFs`] records on each descriptor.
#[derive(Clone)]
pub enum Decoration {
    /// `filename` is the logical name the entry was looked up by.
    Filename,
    /// `filename` is the inner filesystem's real path; `path` is that path
    /// relative to `base`.
    BasePath {
        /// Prefix stripped from the real path.
        base: PathBuf,
    },
    /// `path` is the carrier's `filename` (or the logical name) relative to a
    /// fixed `base`.
    Path {
        /// Prefix stripped from the filename.
        base: PathBuf,
    },
    /// Directories re-open through `fs`; files are left alone.
    CompositeDir {
        /// The filesystem directories are bound to.
        fs: Weak<dyn Fs>,
    },
}

impl std::fmt::Debug for Decoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filename => f.write_str("Filename"),
            Self::BasePath { base } => f.debug_struct("BasePath").field("base", base).finish(),
            Self::Path { base } => f.debug_struct("Path").field("base", base).finish(),
            Self::CompositeDir { fs } => f
                .debug_struct("CompositeDir")
                .field("alive", &(fs.strong_count() > 0))
                .finish(),
        }
    }
}

/// Filesystem wrapper that decorates every descriptor with a [`Decoration`].
///
/// Always lives behind an `Arc` so openers can point back at it.
pub struct DecoratorFs {
    inner: Arc<dyn Fs>,
    decoration: Decoration,
    this: Weak<DecoratorFs>,
}

impl DecoratorFs {
    /// Wrap `inner` with `decoration`.
    pub fn new(inner: Arc<dyn Fs>, decoration: Decoration) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            inner,
            decoration,
            this: this.clone(),
        })
    }

    /// Record the looked-up name as `filename`.
    pub fn filename(inner: Arc<dyn Fs>) -> Arc<Self> {
        Self::new(inner, Decoration::Filename)
    }

    /// Record real paths, with `path` relative to `inner.real_path("")`.
    ///
    /// # Errors
    ///
    /// Whatever `inner.real_path` returns for the root, typically
    /// [`FsError::NotSupported`] for filesystems without a backing path.
    pub fn base_path(inner: Arc<dyn Fs>) -> Result<Arc<Self>, FsError> {
        let base = inner.real_path(Path::new(""))?;
        Ok(Self::new(inner, Decoration::BasePath { base }))
    }

    /// Record `path` as the filename relative to `base`.
    pub fn path(inner: Arc<dyn Fs>, base: impl Into<PathBuf>) -> Arc<Self> {
        Self::new(inner, Decoration::Path { base: base.into() })
    }

    /// Bind directories to `fs`.
    pub fn composite_dir(inner: Arc<dyn Fs>, fs: &Arc<dyn Fs>) -> Arc<Self> {
        Self::new(
            inner,
            Decoration::CompositeDir {
                fs: Arc::downgrade(fs),
            },
        )
    }

    /// The wrapped filesystem.
    pub fn inner(&self) -> &Arc<dyn Fs> {
        &self.inner
    }

    /// The decoration applied.
    pub fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    fn arc(&self) -> Result<Arc<DecoratorFs>, FsError> {
        self.this
            .upgrade()
            .ok_or_else(|| FsError::Backend("decorator filesystem has been dropped".into()))
    }

    fn decorate(&self, name: &Path, info: FileInfo) -> Result<FileInfo, FsError> {
        let (filename, path) = match &self.decoration {
            Decoration::CompositeDir { fs } => return bind_dir(fs, name, info),
            Decoration::Filename => (name.to_path_buf(), PathBuf::new()),
            Decoration::BasePath { base } => {
                let filename =
                    self.inner
                        .real_path(name)
                        .map_err(|e| FsError::PathResolution {
                            operation: "stat",
                            name: info.name.clone(),
                            source: Box::new(e),
                        })?;
                let path = relative_to(&filename, base);
                (filename, path)
            }
            Decoration::Path { base } => {
                let filename = info
                    .meta()
                    .and_then(|m| m.filename())
                    .map_or_else(|| name.to_path_buf(), Path::to_path_buf);
                let path = relative_to(&filename, base);
                (filename, path)
            }
        };

        let this: Arc<dyn Fs> = self.arc()?;
        let opener = Opener::new(this.clone(), name);
        Ok(decorate_file_info(
            Some(this),
            Some(opener),
            info,
            &filename,
            &path,
            None,
        ))
    }

    fn wrap(&self, name: &Path, file: Box<dyn FsFile>) -> Result<Box<dyn FsFile>, FsError> {
        Ok(Box::new(DecoratedFile {
            file,
            fs: self.arc()?,
            name: name.to_path_buf(),
        }))
    }
}

/// Directories re-open through `fs`; files pass through.
fn bind_dir(fs: &Weak<dyn Fs>, name: &Path, info: FileInfo) -> Result<FileInfo, FsError> {
    if !info.is_dir() {
        return Ok(info);
    }
    let fs = fs
        .upgrade()
        .ok_or_else(|| FsError::Backend("bound composite has been dropped".into()))?;
    let opener = Opener::new(fs.clone(), name);
    Ok(decorate_file_info(
        Some(fs),
        Some(opener),
        info,
        Path::new(""),
        Path::new(""),
        None,
    ))
}

/// `filename` with `base` stripped, or `filename` itself when it is not below
/// `base`.
fn relative_to(filename: &Path, base: &Path) -> PathBuf {
    filename
        .strip_prefix(base)
        .map_or_else(|_| filename.to_path_buf(), Path::to_path_buf)
}

impl std::fmt::Debug for DecoratorFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratorFs")
            .field("inner", &self.inner.name())
            .field("decoration", &self.decoration)
            .finish()
    }
}

impl FsRead for DecoratorFs {
    fn name(&self) -> &str {
        "DecoratorFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        let fi = self.inner.stat(path)?;
        self.decorate(path, fi)
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(FileInfo, bool), FsError> {
        let (fi, lstat) = self.inner.lstat_if_possible(path)?;
        Ok((self.decorate(path, fi)?, lstat))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        let file = self.inner.open(path)?;
        self.wrap(path, file)
    }

    fn real_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        self.inner.real_path(path)
    }
}

impl FsWrite for DecoratorFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.write(path, data)
    }

    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        let file = self.inner.open_file(path, flags)?;
        self.wrap(path, file)
    }

    fn chmod(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.chmod(path, perm)
    }

    fn chtimes(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        self.inner.chtimes(path, accessed, modified)
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.create_dir(path, perm)
    }

    fn create_dir_all(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        self.inner.create_dir_all(path, perm)
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove(path)
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.rename(from, to)
    }
}

/// Handle opened through a [`DecoratorFs`]; decorates what it lists.
struct DecoratedFile {
    file: Box<dyn FsFile>,
    fs: Arc<DecoratorFs>,
    name: PathBuf,
}

impl Read for DecoratedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for DecoratedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl FsFile for DecoratedFile {
    fn name(&self) -> &Path {
        &self.name
    }

    fn stat(&self) -> Result<FileInfo, FsError> {
        let fi = self.file.stat()?;
        self.fs.decorate(&self.name, fi)
    }

    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>, FsError> {
        self.file
            .read_dir(count)?
            .into_iter()
            .map(|fi| {
                let child = self.name.join(&fi.name);
                self.fs.decorate(&child, fi)
            })
            .collect()
    }
}

/// [`Layer`] wrapping a filesystem in [`Decoration::Filename`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameDecoratorLayer;

impl Layer<Arc<dyn Fs>> for FilenameDecoratorLayer {
    type Backend = Arc<dyn Fs>;

    fn layer(self, backend: Arc<dyn Fs>) -> Self::Backend {
        DecoratorFs::filename(backend)
    }
}

/// [`Layer`] wrapping a filesystem in [`Decoration::BasePath`].
#[derive(Debug, Clone)]
pub struct BasePathDecoratorLayer {
    base: PathBuf,
}

impl BasePathDecoratorLayer {
    /// Strip `base` from real paths.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Layer<Arc<dyn Fs>> for BasePathDecoratorLayer {
    type Backend = Arc<dyn Fs>;

    fn layer(self, backend: Arc<dyn Fs>) -> Self::Backend {
        DecoratorFs::new(backend, Decoration::BasePath { base: self.base })
    }
}

/// [`Layer`] wrapping a filesystem in [`Decoration::Path`].
#[derive(Debug, Clone)]
pub struct PathDecoratorLayer {
    base: PathBuf,
}

impl PathDecoratorLayer {
    /// Strip `base` from filenames.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Layer<Arc<dyn Fs>> for PathDecoratorLayer {
    type Backend = Arc<dyn Fs>;

    fn layer(self, backend: Arc<dyn Fs>) -> Self::Backend {
        DecoratorFs::path(backend, self.base)
    }
}

/// [`Layer`] wrapping a filesystem in [`Decoration::CompositeDir`].
#[derive(Debug, Clone)]
pub struct CompositeDirLayer {
    fs: Weak<dyn Fs>,
}

impl CompositeDirLayer {
    /// Bind directories to `fs`.
    pub fn new(fs: &Arc<dyn Fs>) -> Self {
        Self {
            fs: Arc::downgrade(fs),
        }
    }
}

impl Layer<Arc<dyn Fs>> for CompositeDirLayer {
    type Backend = Arc<dyn Fs>;

    fn layer(self, backend: Arc<dyn Fs>) -> Self::Backend {
        DecoratorFs::new(backend, Decoration::CompositeDir { fs: self.fs })
    }
}

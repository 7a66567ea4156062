//! # Composite Filesystem
//!
//! [`SliceFs`] presents an ordered list of layers as one read-only tree.
//!
//! ## Resolution
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | `stat` / `open` | first layer where the path exists wins |
//! | `read_dir` | every layer from the winning one onward contributes, in order |
//! | mutations | always [`FsError::PermissionDenied`] |
//!
//! Only [`FsError::NotFound`] lets resolution fall through to the next layer;
//! any other layer error is returned as is.
//!
//! ## Example
//!
//! ```rust
//! use anyfs_composite::{FileMeta, Fs, FsExt, MemoryFs, SliceFs};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let theme: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("layouts/base.html", "theme"));
//! let site: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("layouts/base.html", "site"));
//!
//! let fs = SliceFs::new(vec![
//!     FileMeta::new().with_fs(site),
//!     FileMeta::new().with_fs(theme),
//! ])
//! .unwrap();
//! assert_eq!(fs.read_dir_names(Path::new("layouts")).unwrap(), ["base.html", "base.html"]);
//! ```

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use crate::{
    FileInfo, FileMeta, Fs, FsError, FsFile, FsRead, FsWrite, LanguageAwareMerge, Languages,
    MergeStrategy, NoOpFs, OpenFlags, Opener, Permissions, PlainMerge, decorate_file_info,
};

/// One validated entry of the stack.
struct SliceLayer {
    fs: Arc<dyn Fs>,
    meta: FileMeta,
}

/// Read-only union of an ordered list of filesystems.
///
/// Layers are [`FileMeta`] values whose `fs` is the layer's filesystem; for
/// language-aware composites their `lang` is the layer's language. Index 0 has
/// the highest priority.
///
/// Construction always goes through [`SliceFs::new`],
/// [`SliceFs::new_language_fs`] or [`SliceFs::with_strategy`], which hand back
/// an `Arc<dyn Fs>`. Directory descriptors and handles produced by the
/// composite refer back to it, so it must live behind an `Arc`.
pub struct SliceFs {
    layers: Vec<SliceLayer>,
    strategy: Box<dyn MergeStrategy>,
    this: Weak<SliceFs>,
}

impl SliceFs {
    /// Composite with ordered merge and no deduplication.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfiguration`] if a layer has no filesystem
    pub fn new(layers: Vec<FileMeta>) -> Result<Arc<dyn Fs>, FsError> {
        Self::with_strategy(layers, PlainMerge)
    }

    /// Composite that annotates files with language and weight and keeps only
    /// the best language variant of duplicated file names.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfiguration`] if a layer has no filesystem or
    ///   no language
    ///
    /// ```rust
    /// use anyfs_composite::{FileMeta, Fs, FsError, MemoryFs, SliceFs};
    /// use std::sync::Arc;
    ///
    /// let fs: Arc<dyn Fs> = Arc::new(MemoryFs::new());
    /// let err = SliceFs::new_language_fs(
    ///     ["en"].into_iter().collect(),
    ///     vec![FileMeta::new().with_fs(fs)],
    /// )
    /// .err()
    /// .unwrap();
    /// assert!(matches!(err, FsError::InvalidConfiguration { .. }));
    /// ```
    pub fn new_language_fs(
        languages: Languages,
        layers: Vec<FileMeta>,
    ) -> Result<Arc<dyn Fs>, FsError> {
        for (i, layer) in layers.iter().enumerate() {
            if layer.fs().is_none() {
                return Err(missing(i, "filesystem"));
            }
            if layer.lang().is_none() {
                return Err(missing(i, "language"));
            }
        }
        Self::with_strategy(layers, LanguageAwareMerge::new(languages))
    }

    /// Composite with a caller-supplied merge strategy.
    ///
    /// An empty layer list yields a [`NoOpFs`].
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfiguration`] if a layer has no filesystem
    pub fn with_strategy(
        layers: Vec<FileMeta>,
        strategy: impl MergeStrategy + 'static,
    ) -> Result<Arc<dyn Fs>, FsError> {
        if layers.is_empty() {
            tracing::debug!("no layers, using NoOpFs");
            return Ok(Arc::new(NoOpFs));
        }

        let layers = layers
            .into_iter()
            .enumerate()
            .map(|(i, meta)| {
                let fs = meta.fs().cloned().ok_or_else(|| missing(i, "filesystem"))?;
                Ok(SliceLayer { fs, meta })
            })
            .collect::<Result<Vec<_>, FsError>>()?;

        tracing::debug!(
            layers = layers.len(),
            strategy = strategy.name(),
            "creating composite filesystem"
        );

        let strategy: Box<dyn MergeStrategy> = Box::new(strategy);
        let fs: Arc<SliceFs> = Arc::new_cyclic(|this| SliceFs {
            layers,
            strategy,
            this: this.clone(),
        });
        Ok(fs as Arc<dyn Fs>)
    }

    fn arc(&self) -> Result<Arc<SliceFs>, FsError> {
        self.this
            .upgrade()
            .ok_or_else(|| FsError::Backend("composite filesystem has been dropped".into()))
    }

    fn composite(&self) -> Result<Arc<dyn Fs>, FsError> {
        let fs: Arc<dyn Fs> = self.arc()?;
        Ok(fs)
    }

    /// Stat `name` in each layer until one has it.
    fn pick_first(&self, name: &Path) -> Result<(FileInfo, usize), FsError> {
        for (i, layer) in self.layers.iter().enumerate() {
            match layer.fs.stat(name) {
                Ok(fi) => return Ok((fi, i)),
                Err(e) if e.is_not_found() => continue,
                Err(e) => {
                    tracing::debug!(
                        layer = i,
                        fs = layer.fs.name(),
                        path = %name.display(),
                        error = %e,
                        "layer stat failed"
                    );
                    return Err(e);
                }
            }
        }
        Err(FsError::NotFound {
            path: name.to_path_buf(),
        })
    }

    /// Merge the listings of `name` from layer `start` onward.
    fn read_dirs(&self, name: &Path, start: usize, count: isize) -> Result<Vec<FileInfo>, FsError> {
        let composite = self.composite()?;
        let mut dirs = Vec::new();

        for (i, layer) in self.layers.iter().enumerate().skip(start) {
            let mut dir = match layer.fs.open(name) {
                Ok(dir) => dir,
                Err(e) if e.is_not_found() => continue,
                Err(e) => {
                    tracing::debug!(
                        layer = i,
                        fs = layer.fs.name(),
                        path = %name.display(),
                        error = %e,
                        "layer open failed"
                    );
                    return Err(e);
                }
            };
            let entries = dir.read_dir(-1)?;
            tracing::trace!(
                layer = i,
                path = %name.display(),
                entries = entries.len(),
                "merging layer"
            );
            dirs.extend(self.strategy.annotate(&composite, &layer.meta, name, entries));

            if count > 0 && dirs.len() >= count as usize {
                dirs.truncate(count as usize);
                return Ok(dirs);
            }
        }

        Ok(self.strategy.filter(dirs))
    }
}

fn missing(index: usize, what: &str) -> FsError {
    FsError::InvalidConfiguration {
        reason: format!("layer {index} has no {what}"),
    }
}

fn denied(path: &Path, operation: &'static str) -> FsError {
    FsError::PermissionDenied {
        path: path.to_path_buf(),
        operation,
    }
}

impl std::fmt::Debug for SliceFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceFs")
            .field(
                "layers",
                &self.layers.iter().map(|l| l.fs.name()).collect::<Vec<_>>(),
            )
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl FsRead for SliceFs {
    fn name(&self) -> &str {
        "SliceFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        let (fi, _) = self.pick_first(path)?;
        if !fi.is_dir() {
            return Ok(fi);
        }
        let composite = self.composite()?;
        let opener = Opener::new(composite.clone(), path);
        Ok(decorate_file_info(
            Some(composite),
            Some(opener),
            fi,
            Path::new(""),
            Path::new(""),
            None,
        ))
    }

    /// Same as [`stat`](FsRead::stat); layers are never lstat'ed.
    fn lstat_if_possible(&self, path: &Path) -> Result<(FileInfo, bool), FsError> {
        Ok((self.stat(path)?, false))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        let (fi, idx) = self.pick_first(path)?;
        if !fi.is_dir() {
            return Err(FsError::NotSupported {
                operation: "open file through composite",
            });
        }
        Ok(Box::new(SliceDir {
            fs: self.arc()?,
            idx,
            dirname: path.to_path_buf(),
        }))
    }
}

impl FsWrite for SliceFs {
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

/// Open directory of a [`SliceFs`].
///
/// Each [`read_dir`](FsFile::read_dir) call merges the layers again from the
/// layer that won the lookup, so repeated calls return the same listing.
///
/// A positive `count` stops merging once `count` entries are collected and
/// returns that prefix without the strategy's filter. On a language-aware
/// composite a short page can therefore contain a duplicate that the full
/// listing (`count <= 0`) would drop.
pub struct SliceDir {
    fs: Arc<SliceFs>,
    idx: usize,
    dirname: PathBuf,
}

impl std::fmt::Debug for SliceDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceDir")
            .field("dirname", &self.dirname)
            .field("idx", &self.idx)
            .finish()
    }
}

fn not_a_stream(operation: &'static str) -> io::Error {
    FsError::NotSupported { operation }.into_io()
}

impl Read for SliceDir {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(not_a_stream("read on composite directory"))
    }
}

impl Seek for SliceDir {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(not_a_stream("seek on composite directory"))
    }
}

impl FsFile for SliceDir {
    fn name(&self) -> &Path {
        &self.dirname
    }

    fn stat(&self) -> Result<FileInfo, FsError> {
        self.fs.stat(&self.dirname)
    }

    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>, FsError> {
        self.fs.read_dirs(&self.dirname, self.idx, count)
    }
}

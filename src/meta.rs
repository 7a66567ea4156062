//! # Metadata Carrier
//!
//! Provenance attached to [`FileInfo`] descriptors as they travel through
//! decorators and composites.
//!
//! ## Set-if-not-zero
//!
//! Every setter on [`FileMeta`] ignores zero values: an empty path or string,
//! weight `0`, or `None`. A carrier is built up across a chain of decorators,
//! and a later decorator that has nothing to say for a field leaves the
//! earlier value alone.
//!
//! ```rust
//! use anyfs_composite::FileMeta;
//!
//! let mut meta = FileMeta::new().with_lang("en");
//! meta.set_lang("");
//! assert_eq!(meta.lang(), Some("en"));
//! meta.set_lang("sv");
//! assert_eq!(meta.lang(), Some("sv"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{FileInfo, Fs, FsError, FsFile};

/// Value stored under an extension key of a [`FileMeta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A boolean value.
    Bool(bool),
}

impl MetaValue {
    /// The zero value of each kind is ignored when merging.
    fn is_zero(&self) -> bool {
        match self {
            MetaValue::Str(s) => s.is_empty(),
            MetaValue::Int(i) => *i == 0,
            MetaValue::Bool(b) => !b,
        }
    }
}

/// Deferred re-open of one specific entry.
///
/// Holds the filesystem to open through (shared, not owned) and the logical
/// name. Every [`open`](Self::open) performs fresh I/O; nothing is memoized.
#[derive(Clone)]
pub struct Opener {
    fs: Arc<dyn Fs>,
    name: PathBuf,
}

impl Opener {
    /// Create an opener for `name` on `fs`. Leading separators are stripped.
    pub fn new(fs: Arc<dyn Fs>, name: impl AsRef<Path>) -> Self {
        Self {
            fs,
            name: strip_root(name.as_ref()),
        }
    }

    /// Open the entry.
    pub fn open(&self) -> Result<Box<dyn FsFile>, FsError> {
        self.fs.open(&self.name)
    }

    /// The name that will be opened.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// The filesystem that will be opened through.
    pub fn fs(&self) -> &Arc<dyn Fs> {
        &self.fs
    }
}

impl fmt::Debug for Opener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opener")
            .field("fs", &self.fs.name())
            .field("name", &self.name)
            .finish()
    }
}

/// Typed metadata carrier attached to a decorated [`FileInfo`].
///
/// Also describes a composite layer: a layer is a `FileMeta` with at least a
/// filesystem and, for language-aware composites, a language.
///
/// ```rust
/// use anyfs_composite::{FileMeta, Fs, MemoryFs};
/// use std::sync::Arc;
///
/// let fs: Arc<dyn Fs> = Arc::new(MemoryFs::new());
/// let layer = FileMeta::new().with_fs(fs).with_lang("en");
/// assert_eq!(layer.lang(), Some("en"));
/// assert!(layer.fs().is_some());
/// ```
#[derive(Clone, Default)]
pub struct FileMeta {
    filesystem: Option<Arc<dyn Fs>>,
    opener: Option<Opener>,
    filename: Option<PathBuf>,
    path: Option<PathBuf>,
    lang: Option<String>,
    weight: i32,
    translation_base_name: Option<String>,
    extra: BTreeMap<String, MetaValue>,
}

impl FileMeta {
    /// Create an empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_fs`](Self::set_fs).
    pub fn with_fs(mut self, fs: Arc<dyn Fs>) -> Self {
        self.set_fs(fs);
        self
    }

    /// Builder form of [`set_lang`](Self::set_lang).
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.set_lang(lang);
        self
    }

    /// Builder form of [`set_weight`](Self::set_weight).
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.set_weight(weight);
        self
    }

    /// Builder form of [`set_translation_base_name`](Self::set_translation_base_name).
    pub fn with_translation_base_name(mut self, name: impl Into<String>) -> Self {
        self.set_translation_base_name(name);
        self
    }

    /// Builder form of [`set_extra`](Self::set_extra).
    pub fn with_extra(mut self, key: impl Into<String>, value: MetaValue) -> Self {
        self.set_extra(key, value);
        self
    }

    /// Owning filesystem.
    pub fn fs(&self) -> Option<&Arc<dyn Fs>> {
        self.filesystem.as_ref()
    }

    /// Lazy opener for this entry.
    pub fn opener(&self) -> Option<&Opener> {
        self.opener.as_ref()
    }

    /// Open this entry through its opener.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if no opener has been attached
    pub fn open(&self) -> Result<Box<dyn FsFile>, FsError> {
        match &self.opener {
            Some(opener) => opener.open(),
            None => Err(FsError::NotSupported {
                operation: "open without opener",
            }),
        }
    }

    /// Real filename on the owning filesystem.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Logical path relative to the composite root.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Detected or inherited language.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// Priority weight, 0 when unset.
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Name with language suffix and extension removed.
    pub fn translation_base_name(&self) -> Option<&str> {
        self.translation_base_name.as_deref()
    }

    /// Extension-specific value.
    pub fn extra(&self, key: &str) -> Option<&MetaValue> {
        self.extra.get(key)
    }

    /// Set the owning filesystem.
    pub fn set_fs(&mut self, fs: Arc<dyn Fs>) {
        self.filesystem = Some(fs);
    }

    /// Replace the opener.
    pub fn set_opener(&mut self, opener: Opener) {
        self.opener = Some(opener);
    }

    /// Set the real filename unless `filename` is empty.
    pub fn set_filename(&mut self, filename: impl AsRef<Path>) {
        let filename = filename.as_ref();
        if !filename.as_os_str().is_empty() {
            self.filename = Some(filename.to_path_buf());
        }
    }

    /// Set the logical path unless it is empty. Leading separators are stripped.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        let path = strip_root(path.as_ref());
        if !path.as_os_str().is_empty() {
            self.path = Some(path);
        }
    }

    /// Set the language unless `lang` is empty.
    pub fn set_lang(&mut self, lang: impl Into<String>) {
        let lang = lang.into();
        if !lang.is_empty() {
            self.lang = Some(lang);
        }
    }

    /// Set the weight unless it is 0.
    pub fn set_weight(&mut self, weight: i32) {
        if weight != 0 {
            self.weight = weight;
        }
    }

    /// Set the translation base name unless it is empty.
    pub fn set_translation_base_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.translation_base_name = Some(name);
        }
    }

    /// Set an extension value unless it is a zero value.
    pub fn set_extra(&mut self, key: impl Into<String>, value: MetaValue) {
        if !value.is_zero() {
            self.extra.insert(key.into(), value);
        }
    }

    /// Apply every non-zero field of `patch` to this carrier.
    pub fn merge(&mut self, patch: FileMeta) {
        let FileMeta {
            filesystem,
            opener,
            filename,
            path,
            lang,
            weight,
            translation_base_name,
            extra,
        } = patch;

        if let Some(fs) = filesystem {
            self.set_fs(fs);
        }
        if let Some(opener) = opener {
            self.set_opener(opener);
        }
        if let Some(filename) = filename {
            self.set_filename(filename);
        }
        if let Some(path) = path {
            self.set_path(path);
        }
        if let Some(lang) = lang {
            self.set_lang(lang);
        }
        self.set_weight(weight);
        if let Some(name) = translation_base_name {
            self.set_translation_base_name(name);
        }
        for (key, value) in extra {
            self.set_extra(key, value);
        }
    }
}

impl fmt::Debug for FileMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMeta")
            .field("fs", &self.filesystem.as_ref().map(|fs| fs.name()))
            .field("opener", &self.opener)
            .field("filename", &self.filename)
            .field("path", &self.path)
            .field("lang", &self.lang)
            .field("weight", &self.weight)
            .field("translation_base_name", &self.translation_base_name)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Attach provenance to a descriptor.
///
/// - If `info` is already decorated its carrier is reused and extended.
/// - A `filename` already on the carrier wins over the `filename` hint, so
///   decoration must happen innermost first.
/// - `opener` replaces the carrier's opener when given.
/// - `fs` is recorded for directories only; files are re-opened through
///   their opener.
/// - `path` (leading separators stripped), `filename` and every field of
///   `patch` are applied set-if-not-zero.
///
/// ```rust
/// use anyfs_composite::{decorate_file_info, FileInfo, FileMeta};
/// use std::path::Path;
///
/// let fi = FileInfo::file("a.md", 3);
/// let fi = decorate_file_info(None, None, fi, Path::new("/real/a.md"), Path::new("/a.md"), None);
/// let patch = Some(FileMeta::new().with_lang("en"));
/// let fi = decorate_file_info(None, None, fi, Path::new("/other/a.md"), Path::new(""), patch);
///
/// let meta = fi.meta().unwrap();
/// assert_eq!(meta.filename(), Some(Path::new("/real/a.md")));
/// assert_eq!(meta.path(), Some(Path::new("a.md")));
/// assert_eq!(meta.lang(), Some("en"));
/// ```
pub fn decorate_file_info(
    fs: Option<Arc<dyn Fs>>,
    opener: Option<Opener>,
    mut info: FileInfo,
    filename: &Path,
    path: &Path,
    patch: Option<FileMeta>,
) -> FileInfo {
    let mut meta = info.meta.take().unwrap_or_default();

    if let Some(opener) = opener {
        meta.set_opener(opener);
    }

    if info.is_dir() {
        if let Some(fs) = fs {
            meta.set_fs(fs);
        }
    }

    meta.set_path(path);
    if meta.filename.is_none() {
        meta.set_filename(filename);
    }

    if let Some(patch) = patch {
        meta.merge(patch);
    }

    info.meta = Some(meta);
    info
}

/// Strip leading root/prefix components so paths are stored root-relative.
pub(crate) fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .skip_while(|c| {
            matches!(
                c,
                std::path::Component::RootDir | std::path::Component::Prefix(_)
            )
        })
        .collect()
}

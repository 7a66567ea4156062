//! # anyfs-composite
//!
//! A **read-only composite filesystem** built from an ordered stack of
//! layers, with provenance metadata on every entry it hands out.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_composite::{FileMeta, Fs, FsExt, FsRead, MemoryFs, SliceFs};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let project: Arc<dyn Fs> = Arc::new(
//!     MemoryFs::new()
//!         .with_file("content/about.md", "project")
//!         .with_file("content/index.md", "home"),
//! );
//! let theme: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("content/about.md", "theme"));
//!
//! let fs = SliceFs::new(vec![
//!     FileMeta::new().with_fs(project),
//!     FileMeta::new().with_fs(theme),
//! ])?;
//!
//! // Lookups take the first layer that has the path.
//! assert_eq!(fs.stat(Path::new("content/about.md"))?.size, "project".len() as u64);
//!
//! // Listings merge every layer in order.
//! assert_eq!(
//!     fs.read_dir_names(Path::new("content"))?,
//!     ["about.md", "index.md", "about.md"],
//! );
//! # Ok::<(), anyfs_composite::FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Fs`] | Filesystem trait: [`FsRead`] + [`FsWrite`] |
//! | [`FsFile`] | Open file or directory handle |
//! | [`SliceFs`] | Ordered, read-only union of layers |
//! | [`MergeStrategy`] | How layer listings are annotated and filtered |
//! | [`DecoratorFs`] | Attaches provenance to every descriptor of a filesystem |
//! | [`FileMeta`] | Provenance carried by a [`FileInfo`] |
//! | [`Languages`] | Language identifiers recognized in filenames |
//! | [`FsError`] | Error type with context |
//!
//! ---
//!
//! ## Language-Aware Merging
//!
//! [`SliceFs::new_language_fs`] assigns every file a language and weight:
//!
//! | Filename language | Weight | Language recorded |
//! |-------------------|--------|-------------------|
//! | none | 0 | the layer's |
//! | known, not the layer's | 1 | the filename's |
//! | known, the layer's | 2 | the filename's |
//!
//! When the same file name appears in several layers, only the first entry
//! with the highest weight is listed.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Only [`FsError::NotFound`] lets
//! a composite fall through to the next layer:
//!
//! ```rust
//! use anyfs_composite::FsError;
//! use std::path::PathBuf;
//!
//! let err = FsError::NotFound { path: PathBuf::from("/missing.txt") };
//! assert!(err.is_not_found());
//! assert_eq!(err.to_string(), "not found: /missing.txt");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and methods take `&self`. Composites hold
//! immutable state only; leaf backends use interior mutability.
//!
//! ---
//!
//! ## Logging
//!
//! Composite construction, layer failures and merges are reported through
//! [`tracing`] at `debug` and `trace` level. No subscriber is installed.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`FileInfo`], [`Permissions`], [`Languages`], etc., plus `FsExtJson` |

// Private modules
mod backends;
mod decorator;
mod error;
mod ext;
mod lang;
mod layer;
mod merge;
mod meta;
mod noop;
mod slice_fs;
mod traits;
mod types;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use types::{FileInfo, FileType, OpenFlags, Permissions};

// Public re-exports - traits
pub use traits::{DirListing, Fs, FsFile, FsRead, FsWrite};

// Public re-exports - provenance
pub use lang::{LangInfo, Languages, lang_info_from, weight_for};
pub use meta::{FileMeta, MetaValue, Opener, decorate_file_info};

// Public re-exports - filesystems
pub use backends::{BasePathFs, MemoryFs, OsFs};
pub use decorator::{
    BasePathDecoratorLayer, CompositeDirLayer, Decoration, DecoratorFs, FilenameDecoratorLayer,
    PathDecoratorLayer,
};
pub use merge::{LanguageAwareMerge, MergeStrategy, PlainMerge};
pub use noop::NoOpFs;
pub use slice_fs::{SliceDir, SliceFs};

// Public re-exports - infrastructure
pub use ext::FsExt;
pub use layer::{Layer, LayerExt};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;

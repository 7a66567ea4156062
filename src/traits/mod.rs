//! # Filesystem Traits
//!
//! The capability set every layer provides and the composite exposes again.
//!
//! ```text
//! FsRead + FsWrite = Fs
//!     │
//!     └── open() ──▶ Box<dyn FsFile>   (read bytes, or read_dir for directories)
//! ```
//!
//! | Trait | Methods | Notes |
//! |-------|---------|-------|
//! | [`FsRead`] | `name`, `stat`, `lstat_if_possible`, `open`, `real_path` | consumed from every layer |
//! | [`FsWrite`] | `write`, `open_file`, `chmod`, `chtimes`, `create_dir`, `create_dir_all`, `remove`, `remove_all`, `rename` | rejected by read-only filesystems |
//! | [`FsFile`] | `name`, `stat`, `read_dir`, `read_dir_names` + `Read` + `Seek` | handle returned by `open` |
//!
//! ## Blanket Implementations
//!
//! [`Fs`] is implemented for every type implementing both [`FsRead`] and
//! [`FsWrite`]. Implement the components and `Fs` comes for free.
//!
//! ## Object Safety
//!
//! All traits are object-safe. Layers are held as `Arc<dyn Fs>`:
//!
//! ```rust
//! use anyfs_composite::{Fs, MemoryFs};
//! use std::sync::Arc;
//!
//! let layer: Arc<dyn Fs> = Arc::new(MemoryFs::new());
//! assert_eq!(layer.name(), "MemoryFs");
//! ```

mod fs_dir;
mod fs_file;
mod fs_read;
mod fs_write;

pub use fs_dir::DirListing;
pub use fs_file::FsFile;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// A complete filesystem: reading plus (possibly rejected) mutation.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements [`FsRead`] and
/// [`FsWrite`]. You never need to implement `Fs` directly.
///
/// # Example
///
/// ```rust
/// use anyfs_composite::{Fs, FsError, FsExt};
/// use std::path::Path;
///
/// fn count_entries(fs: &dyn Fs, dir: &Path) -> Result<usize, FsError> {
///     Ok(fs.read_dir(dir)?.len())
/// }
/// ```
pub trait Fs: FsRead + FsWrite {}

impl<T: FsRead + FsWrite> Fs for T {}

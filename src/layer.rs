//! # Layer Trait
//!
//! Tower-style composition for filesystem wrappers.
//!
//! ## Overview
//!
//! A [`Layer`] turns one filesystem into another, typically by wrapping it.
//! The decorator layers ([`FilenameDecoratorLayer`](crate::FilenameDecoratorLayer),
//! [`BasePathDecoratorLayer`](crate::BasePathDecoratorLayer),
//! [`PathDecoratorLayer`](crate::PathDecoratorLayer),
//! [`CompositeDirLayer`](crate::CompositeDirLayer)) are the ones this crate
//! ships.
//!
//! ```text
//! Arc<dyn Fs> ──▶ Layer::layer() ──▶ Arc<dyn Fs>
//! ```
//!
//! ## Fluent Composition
//!
//! [`LayerExt`] adds `.layer()` to any `Arc` of a filesystem:
//!
//! ```rust
//! use anyfs_composite::{BasePathFs, FilenameDecoratorLayer, Fs, FsRead, LayerExt, MemoryFs};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let mem: Arc<dyn Fs> = Arc::new(MemoryFs::new().with_file("blog/a.md", "a"));
//! let fs = mem.layer(FilenameDecoratorLayer);
//!
//! let fi = fs.stat(Path::new("blog/a.md")).unwrap();
//! assert_eq!(fi.meta().unwrap().filename(), Some(Path::new("blog/a.md")));
//! ```

use std::sync::Arc;

use crate::Fs;

/// A layer that wraps a filesystem to add behavior.
///
/// Inspired by Tower's `Layer` trait.
///
/// # Type Parameters
///
/// - `B`: The filesystem being wrapped, usually `Arc<dyn Fs>`
pub trait Layer<B> {
    /// The resulting filesystem after applying this layer.
    type Backend;

    /// Wrap `backend`.
    ///
    /// Consumes both the layer configuration and the backend.
    fn layer(self, backend: B) -> Self::Backend;
}

/// Extension trait for fluent layer composition.
///
/// Implemented for every `Arc<B>` where `B` is a filesystem, including
/// `Arc<dyn Fs>`.
pub trait LayerExt: Sized {
    /// Apply a layer to this filesystem.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Backend {
        layer.layer(self)
    }
}

impl<B: Fs + ?Sized> LayerExt for Arc<B> {}

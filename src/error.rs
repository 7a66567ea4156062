//! Error types for the composite filesystem.

use std::path::PathBuf;

/// Filesystem error type with contextual variants.
///
/// All error variants include relevant context (path, operation) where applicable.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// Only [`FsError::NotFound`] is ever absorbed by the composite (it means "try
/// the next layer"). Every other variant aborts the call it came from.
///
/// # Examples
///
/// ```rust
/// use anyfs_composite::FsError;
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// assert!(err.is_not_found());
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Path/File Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Directory is not empty when it should be.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PathBuf,
    },

    // Permission/Access Errors
    /// Permission denied for operation.
    ///
    /// Every mutation attempted on a read-only composite ends here.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    // Backend/Operation Errors
    /// Operation is not supported by this filesystem or handle.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// A layer failed to resolve the real path of a logical name.
    #[error("{operation} {name}: path resolution failed: {source}")]
    PathResolution {
        /// The operation that needed the real path.
        operation: &'static str,
        /// The logical name that could not be resolved.
        name: String,
        /// The error reported by the layer.
        #[source]
        source: Box<FsError>,
    },

    /// A composite was constructed from an unusable layer list.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Returns `true` for [`FsError::NotFound`].
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    /// Convert an I/O error, attaching the operation and path it belongs to.
    ///
    /// Common [`std::io::ErrorKind`]s map onto the matching variants.
    pub fn from_io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        error: std::io::Error,
    ) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path, operation },
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path, operation },
            _ => FsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }

    /// Wrap this error as an [`std::io::Error`] for `Read`/`Seek` impls.
    pub(crate) fn into_io(self) -> std::io::Error {
        let kind = match &self {
            FsError::NotFound { .. } => std::io::ErrorKind::NotFound,
            FsError::PermissionDenied { .. } => std::io::ErrorKind::PermissionDenied,
            FsError::NotSupported { .. } => std::io::ErrorKind::Unsupported,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, self)
    }
}

impl From<std::io::Error> for FsError {
    fn from(error: std::io::Error) -> Self {
        FsError::from_io("io", PathBuf::new(), error)
    }
}

//! # Extension Traits
//!
//! Convenience methods for filesystems.
//!
//! ## Overview
//!
//! [`FsExt`] provides path-level helpers on top of `stat` and `open`. It has a
//! blanket implementation, so any [`FsRead`] (including `dyn Fs`) gets them
//! for free.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`exists`](FsExt::exists) | Check if path exists |
//! | [`is_file`](FsExt::is_file) | Check if path is a regular file |
//! | [`is_dir`](FsExt::is_dir) | Check if path is a directory |
//! | [`read_dir`](FsExt::read_dir) | Open a directory and list all entries |
//! | [`read_dir_names`](FsExt::read_dir_names) | Same, names only |
//! | [`read`](FsExt::read) | Read a whole file |
//! | [`read_to_string`](FsExt::read_to_string) | Read a whole UTF-8 file |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, `FsExtJson::read_json` reads and
//! deserializes a JSON file.
//!
//! Enable with:
//! ```toml
//! [dependencies]
//! anyfs-composite = { version = "0.1", features = ["serde"] }
//! ```

use std::io::Read;
use std::path::Path;

use crate::{FileInfo, FsError, FsRead};

/// Extension methods for any filesystem.
///
/// # Example
///
/// ```rust
/// use anyfs_composite::{FsExt, FsError, FsRead};
/// use std::path::Path;
///
/// fn list_posts<B: FsRead + ?Sized>(fs: &B) -> Result<Vec<String>, FsError> {
///     if !fs.is_dir(Path::new("content/posts"))? {
///         return Ok(Vec::new());
///     }
///     fs.read_dir_names(Path::new("content/posts"))
/// }
/// ```
pub trait FsExt: FsRead {
    /// Check if the path exists.
    ///
    /// Returns `Ok(false)` for [`FsError::NotFound`]; other errors propagate.
    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a regular file.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_dir(&self, path: &Path) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Open `path` and return all of its entries.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path doesn't exist
    /// - [`FsError::NotADirectory`] if it is a file
    fn read_dir(&self, path: &Path) -> Result<Vec<FileInfo>, FsError> {
        self.open(path)?.read_dir(-1)
    }

    /// Like [`read_dir`](Self::read_dir) but returns names only.
    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>, FsError> {
        self.open(path)?.read_dir_names(-1)
    }

    /// Read the entire contents of a file.
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let mut file = self.open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| FsError::from_io("read", path, e))?;
        Ok(data)
    }

    /// Read the entire contents of a file as UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let mut file = self.open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)
            .map_err(|e| FsError::from_io("read_to_string", path, e))?;
        Ok(data)
    }
}

// Blanket implementation - any filesystem gets FsExt for free
impl<B: FsRead + ?Sized> FsExt for B {}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::de::DeserializeOwned;

    /// JSON deserialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait FsExtJson: FsExt {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::NotFound`: File doesn't exist
        /// - `FsError::Deserialization`: JSON parsing failed
        ///
        /// # Example
        ///
        /// ```rust
        /// # #[cfg(feature = "serde")]
        /// # {
        /// use anyfs_composite::{FsExtJson, Languages, MemoryFs};
        /// use std::path::Path;
        ///
        /// let fs = MemoryFs::new().with_file("languages.json", r#"["en","fr"]"#);
        /// let langs: Languages = fs.read_json(Path::new("languages.json")).unwrap();
        /// assert!(langs.contains("fr"));
        /// # }
        /// ```
        fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, FsError> {
            let data = self.read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }
    }

    // Blanket implementation
    impl<B: FsExt + ?Sized> FsExtJson for B {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsFile, MemoryFs};
    use std::path::PathBuf;

    /// Filesystem whose every lookup fails with a fixed error.
    struct FailingFs {
        not_found: bool,
    }

    impl FsRead for FailingFs {
        fn name(&self) -> &str {
            "FailingFs"
        }

        fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
            if self.not_found {
                Err(FsError::NotFound {
                    path: path.to_path_buf(),
                })
            } else {
                Err(FsError::PermissionDenied {
                    path: path.to_path_buf(),
                    operation: "stat",
                })
            }
        }

        fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
            Err(self.stat(path).unwrap_err())
        }
    }

    fn fixture() -> MemoryFs {
        MemoryFs::new()
            .with_file("docs/readme.md", "hello")
            .with_dir("docs/empty")
    }

    #[test]
    fn exists_and_kind() {
        let fs = fixture();
        assert!(fs.exists(Path::new("docs")).unwrap());
        assert!(fs.is_dir(Path::new("docs")).unwrap());
        assert!(fs.is_file(Path::new("docs/readme.md")).unwrap());
        assert!(!fs.is_file(Path::new("docs")).unwrap());
        assert!(!fs.exists(Path::new("missing")).unwrap());
        assert!(!fs.is_dir(Path::new("missing")).unwrap());
    }

    #[test]
    fn missing_is_not_an_error() {
        let fs = FailingFs { not_found: true };
        assert!(!fs.exists(Path::new("x")).unwrap());
        assert!(!fs.is_file(Path::new("x")).unwrap());
    }

    #[test]
    fn other_errors_propagate() {
        let fs = FailingFs { not_found: false };
        assert!(matches!(
            fs.is_dir(Path::new("x")),
            Err(FsError::PermissionDenied { .. })
        ));
        assert!(matches!(
            fs.read(Path::new("x")),
            Err(FsError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn read_helpers() {
        let fs = fixture();
        assert_eq!(fs.read(Path::new("docs/readme.md")).unwrap(), b"hello");
        assert_eq!(
            fs.read_to_string(Path::new("docs/readme.md")).unwrap(),
            "hello"
        );
        assert_eq!(
            fs.read_dir_names(Path::new("docs")).unwrap(),
            ["empty", "readme.md"]
        );
        assert!(fs.read_dir(Path::new("docs/empty")).unwrap().is_empty());
    }

    #[test]
    fn read_dir_on_file_fails() {
        let err = fixture().read_dir(Path::new("docs/readme.md")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn works_through_trait_objects() {
        let fs: Box<dyn crate::Fs> = Box::new(fixture());
        assert!(fs.is_file(&PathBuf::from("docs/readme.md")).unwrap());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn read_json_reports_bad_input() {
        let fs = MemoryFs::new().with_file("bad.json", "{");
        let err = fs
            .read_json::<Vec<String>>(Path::new("bad.json"))
            .unwrap_err();
        assert!(matches!(err, FsError::Deserialization(_)));
    }
}

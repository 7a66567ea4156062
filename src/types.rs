//! Core types for the composite filesystem.

use std::path::Path;
use std::time::SystemTime;

use crate::FileMeta;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Descriptor of a filesystem entry, optionally decorated with a [`FileMeta`].
///
/// The base part (name, type, size, permissions, modification time) comes from
/// whichever layer produced the entry. The carrier is attached by decoration
/// (see [`decorate_file_info`](crate::decorate_file_info)) and carries
/// provenance: the owning filesystem, real filename, logical path, a lazy
/// opener, and language information.
///
/// A `FileInfo` is immutable once built; decoration consumes it and returns a
/// new one.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileInfo {
    /// Name of the entry (last path component only).
    pub name: String,
    /// Type of the entry.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Permissions.
    pub permissions: Permissions,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) meta: Option<FileMeta>,
}

impl FileInfo {
    /// Create an undecorated descriptor for a regular file.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::File,
            size,
            permissions: Permissions::default_file(),
            modified: SystemTime::UNIX_EPOCH,
            meta: None,
        }
    }

    /// Create an undecorated descriptor for a directory.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::Directory,
            size: 0,
            permissions: Permissions::default_dir(),
            modified: SystemTime::UNIX_EPOCH,
            meta: None,
        }
    }

    /// Build a descriptor from [`std::fs::Metadata`].
    pub fn from_std(name: impl Into<String>, md: &std::fs::Metadata) -> Self {
        let file_type = if md.is_dir() {
            FileType::Directory
        } else if md.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        };

        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            Permissions::from_mode(md.permissions().mode())
        };
        #[cfg(not(unix))]
        let permissions = match (file_type, md.permissions().readonly()) {
            (FileType::Directory, _) => Permissions::default_dir(),
            (_, true) => Permissions::from_mode(0o444),
            (_, false) => Permissions::default_file(),
        };

        Self {
            name: name.into(),
            file_type,
            size: md.len(),
            permissions,
            modified: md.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            meta: None,
        }
    }

    /// Name for a path: its last component, or `"/"` for the root.
    pub(crate) fn name_of(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string())
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    /// The metadata carrier, if this entry has been decorated.
    #[inline]
    pub fn meta(&self) -> Option<&FileMeta> {
        self.meta.as_ref()
    }

    /// Returns `true` if a metadata carrier is attached.
    #[inline]
    pub fn is_decorated(&self) -> bool {
        self.meta.is_some()
    }

    /// Weight from the carrier, 0 when undecorated.
    #[inline]
    pub fn weight(&self) -> i32 {
        self.meta.as_ref().map_or(0, FileMeta::weight)
    }
}

/// Unix-style permissions stored as a mode bitmask.
///
/// Uses the standard Unix permission bits (rwxrwxrwx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if these permissions deny writing.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Flags for opening a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create file if it doesn't exist.
    pub create: bool,
    /// Truncate file to zero length.
    pub truncate: bool,
    /// Append to end of file.
    pub append: bool,
}

impl OpenFlags {
    /// Read-only access.
    pub const READ: Self = Self {
        read: true,
        write: false,
        create: false,
        truncate: false,
        append: false,
    };

    /// Write access with create and truncate.
    pub const WRITE: Self = Self {
        read: false,
        write: true,
        create: true,
        truncate: true,
        append: false,
    };

    /// Append mode - writes go to end of file.
    pub const APPEND: Self = Self {
        read: false,
        write: true,
        create: true,
        truncate: false,
        append: true,
    };

    /// Returns `true` if any flag would modify the filesystem.
    #[inline]
    pub const fn mutates(&self) -> bool {
        self.write || self.create || self.truncate || self.append
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_info_constructors() {
        let f = FileInfo::file("post.md", 12);
        assert!(f.is_file());
        assert!(!f.is_dir());
        assert_eq!(f.size, 12);
        assert!(!f.is_decorated());

        let d = FileInfo::dir("content");
        assert!(d.is_dir());
        assert_eq!(d.permissions, Permissions::default_dir());
    }

    #[test]
    fn undecorated_weight_is_zero() {
        assert_eq!(FileInfo::file("a.md", 0).weight(), 0);
    }

    #[test]
    fn name_of_root_and_nested() {
        assert_eq!(FileInfo::name_of(Path::new("")), "/");
        assert_eq!(FileInfo::name_of(Path::new("a/b.md")), "b.md");
    }

    #[test]
    fn permissions_from_mode_masks_extra_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_readonly() {
        assert!(Permissions::from_mode(0o444).readonly());
        assert!(!Permissions::from_mode(0o644).readonly());
    }

    #[test]
    fn open_flags_mutates() {
        assert!(!OpenFlags::READ.mutates());
        assert!(OpenFlags::WRITE.mutates());
        assert!(OpenFlags::APPEND.mutates());
        let truncate_only = OpenFlags {
            truncate: true,
            ..OpenFlags::READ
        };
        assert!(truncate_only.mutates());
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<FileInfo>();
        assert_send_sync::<Permissions>();
        assert_send_sync::<OpenFlags>();
    }
}

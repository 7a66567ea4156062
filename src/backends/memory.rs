//! In-memory filesystem.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::RwLock;

use super::handle::{Content, Handle};
use super::normalize;
use crate::{
    DirListing, FileInfo, FileType, FsError, FsFile, FsRead, FsWrite, OpenFlags, Permissions,
};

#[derive(Debug, Clone)]
enum Node {
    Dir {
        permissions: Permissions,
        modified: SystemTime,
    },
    File {
        data: Vec<u8>,
        permissions: Permissions,
        modified: SystemTime,
    },
}

impl Node {
    fn info(&self, name: String) -> FileInfo {
        match self {
            Node::Dir {
                permissions,
                modified,
            } => FileInfo {
                permissions: *permissions,
                modified: *modified,
                ..FileInfo::dir(name)
            },
            Node::File {
                data,
                permissions,
                modified,
            } => FileInfo {
                permissions: *permissions,
                modified: *modified,
                ..FileInfo::file(name, data.len() as u64)
            },
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Node::Dir { .. })
    }
}

/// An in-memory filesystem.
///
/// Paths are normalized to root-relative form, so `"/a/b"`, `"a/b"` and
/// `"a/./b"` address the same entry. Directory listings are sorted by name.
///
/// ```rust
/// use anyfs_composite::{FsExt, FsRead, MemoryFs};
/// use std::path::Path;
///
/// let fs = MemoryFs::new().with_file("content/post.md", "hello");
/// assert!(fs.is_dir(Path::new("content")).unwrap());
/// assert_eq!(fs.read_to_string(Path::new("/content/post.md")).unwrap(), "hello");
/// ```
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create an empty filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            PathBuf::new(),
            Node::Dir {
                permissions: Permissions::default_dir(),
                modified: SystemTime::now(),
            },
        );
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Add a file, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if a parent is a file
    /// - [`FsError::NotAFile`] if `path` is a directory
    pub fn try_with_file(
        self,
        path: impl AsRef<Path>,
        data: impl AsRef<[u8]>,
    ) -> Result<Self, FsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent, Permissions::default_dir())?;
        }
        self.write(path, data.as_ref())?;
        Ok(self)
    }

    /// Add a directory and its missing parents.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `path` or one of its parents is a file
    pub fn try_with_dir(self, path: impl AsRef<Path>) -> Result<Self, FsError> {
        self.create_dir_all(path.as_ref(), Permissions::default_dir())?;
        Ok(self)
    }

    /// Fixture builder for [`try_with_file`](Self::try_with_file).
    ///
    /// # Panics
    ///
    /// If the file cannot be created.
    pub fn with_file(self, path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Self {
        let path = path.as_ref();
        self.try_with_file(path, data)
            .unwrap_or_else(|e| panic!("cannot add fixture file {}: {e}", path.display()))
    }

    /// Fixture builder for [`try_with_dir`](Self::try_with_dir).
    ///
    /// # Panics
    ///
    /// If the directory cannot be created.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.try_with_dir(path)
            .unwrap_or_else(|e| panic!("cannot add fixture directory {}: {e}", path.display()))
    }

    fn key(path: &Path) -> Result<PathBuf, FsError> {
        normalize(path).ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn children(nodes: &BTreeMap<PathBuf, Node>, dir: &Path) -> Vec<FileInfo> {
        nodes
            .iter()
            .filter(|(k, _)| k.parent() == Some(dir))
            .map(|(k, node)| node.info(FileInfo::name_of(k)))
            .collect()
    }

    fn require_parent_dir(
        nodes: &BTreeMap<PathBuf, Node>,
        key: &Path,
        original: &Path,
    ) -> Result<(), FsError> {
        let parent = key.parent().unwrap_or(Path::new(""));
        match nodes.get(parent) {
            Some(node) if node.is_dir() => Ok(()),
            Some(_) => Err(FsError::NotADirectory {
                path: parent.to_path_buf(),
            }),
            None => Err(FsError::NotFound {
                path: original.to_path_buf(),
            }),
        }
    }
}

impl FsRead for MemoryFs {
    fn name(&self) -> &str {
        "MemoryFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        let key = Self::key(path)?;
        let nodes = self.nodes.read();
        nodes
            .get(&key)
            .map(|node| node.info(FileInfo::name_of(&key)))
            .ok_or_else(|| FsError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        let key = Self::key(path)?;
        let nodes = self.nodes.read();
        let node = nodes.get(&key).ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })?;
        let info = node.info(FileInfo::name_of(&key));
        let content = match node {
            Node::Dir { .. } => Content::Dir(DirListing::new(Self::children(&nodes, &key))),
            Node::File { data, .. } => Content::Bytes(Cursor::new(data.clone())),
        };
        Ok(Box::new(Handle::new(path, info, content)))
    }
}

impl FsWrite for MemoryFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        Self::require_parent_dir(&nodes, &key, path)?;
        let permissions = match nodes.get(&key) {
            Some(Node::Dir { .. }) => {
                return Err(FsError::NotAFile {
                    path: path.to_path_buf(),
                });
            }
            Some(Node::File { permissions, .. }) => *permissions,
            None => Permissions::default_file(),
        };
        nodes.insert(
            key,
            Node::File {
                data: data.to_vec(),
                permissions,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        let exists = self.stat(path).is_ok();
        if (flags.create && !exists) || (flags.truncate && exists) {
            self.write(path, &[])?;
        }
        self.open(path)
    }

    fn chmod(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&key) {
            Some(Node::Dir { permissions, .. }) | Some(Node::File { permissions, .. }) => {
                *permissions = perm;
                Ok(())
            }
            None => Err(FsError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn chtimes(
        &self,
        path: &Path,
        _accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&key) {
            Some(Node::Dir { modified: m, .. }) | Some(Node::File { modified: m, .. }) => {
                *m = modified;
                Ok(())
            }
            None => Err(FsError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&key) {
            return Err(FsError::AlreadyExists {
                path: path.to_path_buf(),
                operation: "create_dir",
            });
        }
        Self::require_parent_dir(&nodes, &key, path)?;
        nodes.insert(
            key,
            Node::Dir {
                permissions: perm,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        let mut current = PathBuf::new();
        for component in key.components() {
            current.push(component);
            match nodes.get(&current) {
                Some(node) if node.is_dir() => {}
                Some(_) => {
                    return Err(FsError::NotADirectory {
                        path: current.clone(),
                    });
                }
                None => {
                    nodes.insert(
                        current.clone(),
                        Node::Dir {
                            permissions: perm,
                            modified: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        let key = Self::key(path)?;
        if key.as_os_str().is_empty() {
            return Err(FsError::PermissionDenied {
                path: path.to_path_buf(),
                operation: "remove",
            });
        }
        let mut nodes = self.nodes.write();
        let has_children = nodes.keys().any(|k| k.parent() == Some(key.as_path()));
        match nodes.get(&key) {
            None => {
                return Err(FsError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(node) if node.is_dir() && has_children => {
                return Err(FsError::DirectoryNotEmpty {
                    path: path.to_path_buf(),
                });
            }
            Some(_) => {}
        }
        nodes.remove(&key);
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        let key = Self::key(path)?;
        let mut nodes = self.nodes.write();
        if key.as_os_str().is_empty() {
            nodes.retain(|k, _| k.as_os_str().is_empty());
        } else {
            nodes.retain(|k, _| !k.starts_with(&key));
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let from_key = Self::key(from)?;
        let to_key = Self::key(to)?;
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&from_key) || from_key.as_os_str().is_empty() {
            return Err(FsError::NotFound {
                path: from.to_path_buf(),
            });
        }
        Self::require_parent_dir(&nodes, &to_key, to)?;

        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|k| k.starts_with(&from_key))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let suffix = old.strip_prefix(&from_key).unwrap_or(Path::new(""));
                nodes.insert(to_key.join(suffix), node);
            }
        }
        Ok(())
    }
}

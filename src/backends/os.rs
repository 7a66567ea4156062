//! Native filesystem via `std::fs`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::handle::{Content, Handle};
use crate::{DirListing, FileInfo, FsError, FsFile, FsRead, FsWrite, OpenFlags, Permissions};

/// The host filesystem.
///
/// Paths are passed to `std::fs` unchanged. Wrap it in a
/// [`BasePathFs`](crate::BasePathFs) to confine it below a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl OsFs {
    /// Create a new handle to the host filesystem.
    pub fn new() -> Self {
        Self
    }

    fn list(path: &Path) -> Result<Vec<FileInfo>, FsError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FsError::from_io("read_dir", path, e))? {
            let entry = entry.map_err(|e| FsError::from_io("read_dir", path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks like stat does; fall back to the link itself.
            let md = match fs::metadata(entry.path()) {
                Ok(md) => md,
                Err(_) => entry
                    .metadata()
                    .map_err(|e| FsError::from_io("read_dir", entry.path(), e))?,
            };
            entries.push(FileInfo::from_std(name, &md));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl FsRead for OsFs {
    fn name(&self) -> &str {
        "OsFs"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        let md = fs::metadata(path).map_err(|e| FsError::from_io("stat", path, e))?;
        Ok(FileInfo::from_std(FileInfo::name_of(path), &md))
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(FileInfo, bool), FsError> {
        let md = fs::symlink_metadata(path).map_err(|e| FsError::from_io("lstat", path, e))?;
        Ok((FileInfo::from_std(FileInfo::name_of(path), &md), true))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        let info = self.stat(path)?;
        let content = if info.is_dir() {
            Content::Dir(DirListing::new(Self::list(path)?))
        } else {
            Content::File(fs::File::open(path).map_err(|e| FsError::from_io("open", path, e))?)
        };
        Ok(Box::new(Handle::new(path, info, content)))
    }

    fn real_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        std::path::absolute(path).map_err(|e| FsError::from_io("real_path", path, e))
    }
}

impl FsWrite for OsFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        fs::write(path, data).map_err(|e| FsError::from_io("write", path, e))
    }

    fn open_file(&self, path: &Path, flags: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        if flags.mutates() {
            fs::OpenOptions::new()
                .write(true)
                .create(flags.create)
                .truncate(flags.truncate)
                .append(flags.append)
                .open(path)
                .map_err(|e| FsError::from_io("open_file", path, e))?;
        }
        self.open(path)
    }

    fn chmod(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(perm.mode())
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut p = fs::metadata(path)
                .map_err(|e| FsError::from_io("chmod", path, e))?
                .permissions();
            p.set_readonly(perm.readonly());
            p
        };
        fs::set_permissions(path, permissions).map_err(|e| FsError::from_io("chmod", path, e))
    }

    fn chtimes(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        let file = fs::File::open(path).map_err(|e| FsError::from_io("chtimes", path, e))?;
        let times = fs::FileTimes::new()
            .set_accessed(accessed)
            .set_modified(modified);
        file.set_times(times)
            .map_err(|e| FsError::from_io("chtimes", path, e))
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(perm.mode());
        }
        #[cfg(not(unix))]
        let _ = perm;
        builder
            .create(path)
            .map_err(|e| FsError::from_io("create_dir", path, e))
    }

    fn create_dir_all(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(perm.mode());
        }
        #[cfg(not(unix))]
        let _ = perm;
        builder
            .create(path)
            .map_err(|e| FsError::from_io("create_dir_all", path, e))
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        let md = fs::symlink_metadata(path).map_err(|e| FsError::from_io("remove", path, e))?;
        let result = if md.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| match e.kind() {
            std::io::ErrorKind::DirectoryNotEmpty => FsError::DirectoryNotEmpty {
                path: path.to_path_buf(),
            },
            _ => FsError::from_io("remove", path, e),
        })
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        let md = match fs::symlink_metadata(path) {
            Ok(md) => md,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FsError::from_io("remove_all", path, e)),
        };
        let result = if md.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| FsError::from_io("remove_all", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|e| FsError::from_io("rename", from, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsExt;
    use std::io::Read;

    #[test]
    fn stat_and_open_real_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.txt"), "bee").unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let fs = OsFs::new();
        assert!(fs.stat(tmp.path()).unwrap().is_dir());
        assert_eq!(
            fs.read_dir_names(tmp.path()).unwrap(),
            ["a.txt", "b.txt", "sub"]
        );

        let mut f = fs.open(&tmp.path().join("b.txt")).unwrap();
        let mut s = String::new();
        f.read_to_string(&mut s).unwrap();
        assert_eq!(s, "bee");
    }

    #[test]
    fn missing_path_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = OsFs.stat(&tmp.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn real_path_is_absolute() {
        let p = OsFs.real_path(Path::new("relative/x")).unwrap();
        assert!(p.is_absolute());
    }

    #[test]
    fn remove_all_missing_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        OsFs.remove_all(&tmp.path().join("missing")).unwrap();
    }
}

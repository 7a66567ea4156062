//! Open handle shared by the leaf backends.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::{DirListing, FileInfo, FsError, FsFile};

pub(crate) enum Content {
    Bytes(Cursor<Vec<u8>>),
    File(std::fs::File),
    Dir(DirListing),
}

/// Handle over in-memory bytes, an OS file, or a directory listing snapshot.
pub(crate) struct Handle {
    name: PathBuf,
    info: FileInfo,
    content: Content,
}

impl Handle {
    pub(crate) fn new(name: impl Into<PathBuf>, info: FileInfo, content: Content) -> Self {
        Self {
            name: name.into(),
            info,
            content,
        }
    }

    fn not_a_file(&self) -> io::Error {
        FsError::NotAFile {
            path: self.name.clone(),
        }
        .into_io()
    }
}

impl Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.content {
            Content::Bytes(cursor) => cursor.read(buf),
            Content::File(file) => file.read(buf),
            Content::Dir(_) => Err(self.not_a_file()),
        }
    }
}

impl Seek for Handle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.content {
            Content::Bytes(cursor) => cursor.seek(pos),
            Content::File(file) => file.seek(pos),
            Content::Dir(_) => Err(self.not_a_file()),
        }
    }
}

impl FsFile for Handle {
    fn name(&self) -> &Path {
        &self.name
    }

    fn stat(&self) -> Result<FileInfo, FsError> {
        Ok(self.info.clone())
    }

    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>, FsError> {
        match &mut self.content {
            Content::Dir(listing) => Ok(listing.next_page(count)),
            _ => Err(FsError::NotADirectory {
                path: self.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_handle_reads_and_seeks() {
        let mut h = Handle::new(
            "a.txt",
            FileInfo::file("a.txt", 5),
            Content::Bytes(Cursor::new(b"hello".to_vec())),
        );
        h.seek(SeekFrom::Start(1)).unwrap();
        let mut s = String::new();
        h.read_to_string(&mut s).unwrap();
        assert_eq!(s, "ello");
        assert!(matches!(h.read_dir(0), Err(FsError::NotADirectory { .. })));
    }

    #[test]
    fn dir_handle_rejects_reads() {
        let mut h = Handle::new(
            "d",
            FileInfo::dir("d"),
            Content::Dir(DirListing::new(vec![FileInfo::file("x", 0)])),
        );
        let mut buf = [0u8; 4];
        assert!(h.read(&mut buf).is_err());
        assert_eq!(h.read_dir_names(-1).unwrap(), ["x"]);
    }
}

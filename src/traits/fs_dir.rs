//! Paged directory listings for backend handles.

use crate::FileInfo;

/// A snapshot of directory entries handed out page by page.
///
/// Backends take the snapshot when a directory is opened, so entries are
/// fetched once per handle and each [`next_page`](Self::next_page) call
/// continues where the previous one stopped.
///
/// # Example
///
/// ```rust
/// use anyfs_composite::{DirListing, FileInfo};
///
/// let mut listing = DirListing::new(vec![
///     FileInfo::file("a.md", 1),
///     FileInfo::file("b.md", 2),
///     FileInfo::dir("c"),
/// ]);
/// assert_eq!(listing.next_page(2).len(), 2);
/// assert_eq!(listing.next_page(0).len(), 1);
/// assert!(listing.next_page(0).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirListing {
    entries: Vec<FileInfo>,
    pos: usize,
}

impl DirListing {
    /// Create from a pre-collected vector.
    pub fn new(entries: Vec<FileInfo>) -> Self {
        Self { entries, pos: 0 }
    }

    /// Take the next `count` entries, or all remaining when `count <= 0`.
    pub fn next_page(&mut self, count: isize) -> Vec<FileInfo> {
        let remaining = self.entries.len() - self.pos;
        let take = if count > 0 {
            remaining.min(count as usize)
        } else {
            remaining
        };
        let page = self.entries[self.pos..self.pos + take].to_vec();
        self.pos += take;
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> DirListing {
        DirListing::new(vec![
            FileInfo::file("a", 0),
            FileInfo::file("b", 0),
            FileInfo::dir("c"),
        ])
    }

    #[test]
    fn pages_continue_where_previous_stopped() {
        let mut l = listing();
        let first: Vec<_> = l.next_page(2).into_iter().map(|f| f.name).collect();
        assert_eq!(first, ["a", "b"]);
        let second: Vec<_> = l.next_page(2).into_iter().map(|f| f.name).collect();
        assert_eq!(second, ["c"]);
        assert!(l.next_page(2).is_empty());
    }

    #[test]
    fn non_positive_count_takes_everything() {
        assert_eq!(listing().next_page(0).len(), 3);
        assert_eq!(listing().next_page(-1).len(), 3);
    }
}

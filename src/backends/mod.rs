//! # Leaf Backends
//!
//! Concrete filesystems that can serve as composite layers.
//!
//! | Backend | Storage | `real_path` |
//! |---------|---------|-------------|
//! | [`MemoryFs`] | in-memory tree | not supported |
//! | [`OsFs`] | `std::fs` | absolute path |
//! | [`BasePathFs`] | any `Fs`, restricted to a base directory | `base` joined with the name |

mod base_path;
mod handle;
mod memory;
mod os;

pub use base_path::BasePathFs;
pub use memory::MemoryFs;
pub use os::OsFs;

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path` to a root-relative path.
///
/// `.` components are dropped and `..` pops the previous component. Returns
/// `None` if the path climbs above the root.
pub(crate) fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    Some(out)
}

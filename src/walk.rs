//! Depth-first traversal of the local tree.
//!
//! Entries come out in pre-order: the root first, every directory before
//! its children. Siblings keep the native order of the filesystem unless
//! [`WalkOptions::sort_by_name`] is set, so the order is not stable across
//! filesystems by default.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One item of the local tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Directory(PathBuf),
    File(PathBuf),
}

impl TreeEntry {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Visit siblings sorted by file name instead of in native order.
    pub sort_by_name: bool,
    /// Follow symbolic links. Otherwise a link is visited as a file.
    pub follow_links: bool,
}

/// Lazy iterator over the entries below a root.
///
/// A failure to read an entry is yielded as an `Err` item rather than
/// skipped; the walk can be resumed but callers normally stop there.
pub struct TreeWalker {
    inner: walkdir::IntoIter,
}

impl TreeWalker {
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P, options: WalkOptions) -> Self {
        let mut walker = WalkDir::new(root).follow_links(options.follow_links);
        if options.sort_by_name {
            walker = walker.sort_by_file_name();
        }

        Self {
            inner: walker.into_iter(),
        }
    }
}

impl Iterator for TreeWalker {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(err) => return Some(Err(Error::walk(err))),
        };

        let entry = if entry.file_type().is_dir() {
            TreeEntry::Directory(entry.into_path())
        } else {
            TreeEntry::File(entry.into_path())
        };

        Some(Ok(entry))
    }
}

/// Calls `visit` for every entry below `root`, stopping at the first error
/// it returns. Read failures are handed to `visit` as well.
///
/// A thin wrapper over [`TreeWalker`] for synchronous visitors. The
/// uploader iterates a [`TreeWalker`] directly because its per-entry work
/// is async, and a callback cannot await.
pub fn walk<P, F>(root: P, options: WalkOptions, mut visit: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(Result<TreeEntry>) -> Result<()>,
{
    for entry in TreeWalker::new(root, options) {
        visit(entry)?;
    }

    Ok(())
}

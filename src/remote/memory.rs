//! In-memory remote filesystem.
//!
//! Records every operation in call order and can be told to fail on
//! specific paths, which makes it a stand-in for a real server in tests
//! and benchmarks.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    io,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};
use tokio::io::AsyncWrite;

use super::{RemoteError, RemoteFs};
use crate::path::{is_implicit, remote_ancestors, remote_parent};

/// Operation issued against a [`MemoryFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    CreateDirAll(String),
    CreateFile(String),
    Close,
}

#[derive(Debug, Default)]
struct State {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    ops: Vec<RemoteOp>,
    fail_dirs: HashSet<String>,
    fail_files: HashSet<String>,
    fail_writes: HashSet<String>,
}

impl State {
    fn is_dir(&self, path: &str) -> bool {
        is_implicit(path) || self.dirs.contains(path.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
}

fn rejected(path: &str) -> RemoteError {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("{path}: rejected")).into()
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes directory creation fail when it reaches `path`.
    pub fn fail_create_dir<P: Into<String>>(&self, path: P) {
        let _ = self.lock().fail_dirs.insert(path.into());
    }

    /// Makes file creation at `path` fail.
    pub fn fail_create_file<P: Into<String>>(&self, path: P) {
        let _ = self.lock().fail_files.insert(path.into());
    }

    /// Makes every write to the file at `path` fail.
    pub fn fail_write<P: Into<String>>(&self, path: P) {
        let _ = self.lock().fail_writes.insert(path.into());
    }

    #[must_use]
    pub fn ops(&self) -> Vec<RemoteOp> {
        self.lock().ops.clone()
    }

    #[must_use]
    pub fn is_dir(&self, path: &str) -> bool {
        self.lock().is_dir(path)
    }

    #[must_use]
    pub fn directories(&self) -> Vec<String> {
        self.lock().dirs.iter().cloned().collect()
    }

    /// Contents of the file at `path`, if there is one.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }
}

#[async_trait]
impl RemoteFs for MemoryFs {
    type File = MemoryFile;

    async fn create_dir_all(&self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.ops.push(RemoteOp::CreateDirAll(path.to_owned()));

        for dir in remote_ancestors(path) {
            if state.files.contains_key(dir) {
                return Err(RemoteError::NotADirectory(dir.to_owned()));
            }
            if state.dirs.contains(dir) {
                continue;
            }
            if state.fail_dirs.contains(dir) {
                return Err(rejected(dir));
            }
            let _ = state.dirs.insert(dir.to_owned());
        }

        Ok(())
    }

    async fn create_file(&self, path: &str) -> Result<Self::File, RemoteError> {
        let mut state = self.lock();
        state.ops.push(RemoteOp::CreateFile(path.to_owned()));

        if state.fail_files.contains(path) {
            return Err(rejected(path));
        }
        if state.is_dir(path) {
            return Err(io::Error::other(format!("{path} is a directory")).into());
        }
        if !state.is_dir(remote_parent(path)) {
            let err = io::Error::new(io::ErrorKind::NotFound, format!("{path}: no such file"));
            return Err(err.into());
        }

        let _ = state.files.insert(path.to_owned(), Vec::new());

        Ok(MemoryFile {
            state: self.state.clone(),
            path: path.to_owned(),
            fail: state.fail_writes.contains(path),
        })
    }

    async fn close(&self) -> Result<(), RemoteError> {
        self.lock().ops.push(RemoteOp::Close);
        Ok(())
    }
}

/// Write handle of a [`MemoryFs`] file. Bytes land in the file as soon as
/// they are written.
#[derive(Debug)]
pub struct MemoryFile {
    state: Arc<Mutex<State>>,
    path: String,
    fail: bool,
}

impl AsyncWrite for MemoryFile {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        if self.fail {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{}: write failed", self.path),
            )));
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);

        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

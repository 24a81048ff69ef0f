//! Remote filesystem capabilities used by the uploader.
//!
//! Only what a mirror run needs is exposed: recursive directory creation and
//! file creation. [`SftpSession`](russh_sftp::client::SftpSession) is the
//! real backend, [`MemoryFs`] keeps everything in memory.

pub mod memory;
mod sftp;

use std::io;
use thiserror::Error;
use tokio::io::AsyncWrite;

pub use memory::{MemoryFs, RemoteOp};

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Error reported by the SFTP server or client
    #[error("SFTP: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),
    /// A non-directory is in the way of a directory
    #[error("{0} exists and is not a directory")]
    NotADirectory(String),
    /// Any errors related to I/O
    #[error("I/O: {0}")]
    Io(#[from] io::Error),
}

/// Remote side of a mirror run.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// Destination of a file upload. Dropping it releases the remote handle.
    type File: AsyncWrite + Unpin + Send;

    /// Creates `path` and any missing parent. An existing directory is
    /// not an error.
    async fn create_dir_all(&self, path: &str) -> Result<(), RemoteError>;

    /// Creates the file at `path` for writing, truncating it if it exists.
    async fn create_file(&self, path: &str) -> Result<Self::File, RemoteError>;

    /// Releases the session.
    async fn close(&self) -> Result<(), RemoteError>;
}

use std::{
    fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::remote::RemoteError;

pub type Result<T> = std::result::Result<T, Error>;

/// Any error a file transfer step can fail with, local or remote.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Step of a single file upload that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    OpenLocal,
    CreateRemoteParent,
    CreateRemoteFile,
    Copy,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::OpenLocal => "open local file",
            Self::CreateRemoteParent => "create remote parent directory",
            Self::CreateRemoteFile => "create remote file",
            Self::Copy => "copy",
        };
        f.write_str(step)
    }
}

/// Enum for every failure that stops a mirror run
#[derive(Debug, Error)]
pub enum Error {
    /// TCP or SSH level failure while connecting
    #[error("SSH connection error: {0}")]
    Connect(#[from] russh::Error),
    /// The server refused the supplied password
    #[error("SSH connection error: authentication rejected for user {user}")]
    AuthRejected { user: String },
    /// The `sftp` subsystem could not be initialized
    #[error("Failed to initialize SFTP client: {0}")]
    Session(#[source] russh_sftp::client::error::Error),
    /// The local root is missing or unreadable
    #[error("local directory {}: {source}", .path.display())]
    LocalRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A local entry could not be read during traversal
    #[error("failed to read local entry {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    /// Creating the remote directory of a directory entry failed
    #[error("failed to create remote directory {remote}: {source}")]
    CreateDir { remote: String, source: RemoteError },
    /// One of the steps of a file upload failed
    #[error("failed to {step} ({} -> {remote}): {source}", .local.display())]
    Transfer {
        step: UploadStep,
        local: PathBuf,
        remote: String,
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn walk(error: walkdir::Error) -> Self {
        Self::Walk {
            path: error.path().map(Path::to_path_buf).unwrap_or_default(),
            source: error,
        }
    }

    pub(crate) fn transfer<E>(step: UploadStep, local: &Path, remote: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transfer {
            step,
            local: local.to_path_buf(),
            remote: remote.to_owned(),
            source: source.into(),
        }
    }

    /// Returns the failed file step, if this error comes from a file upload.
    #[must_use]
    pub const fn step(&self) -> Option<UploadStep> {
        match self {
            Self::Transfer { step, .. } => Some(*step),
            _ => None,
        }
    }
}

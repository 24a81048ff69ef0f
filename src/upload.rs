//! Upload of a local tree onto a remote filesystem.
//!
//! Entries are processed one at a time in walk order. The first failure
//! stops the run and whatever was already created remotely stays there.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt, BufReader},
};

use crate::{
    error::{Error, Result, UploadStep},
    event::{EventRecorder, LogRecorder, UploadEvent},
    path::{map_to_remote, remote_parent},
    remote::RemoteFs,
    walk::{TreeEntry, TreeWalker, WalkOptions},
};

/// Read buffer of a file copy. Matches the default maximum SFTP write
/// length so every remote write carries a full packet.
pub const COPY_BUFFER_SIZE: usize = 255 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Report progress at `info` instead of `debug` with the default recorder.
    pub verbose: bool,
    pub walk: WalkOptions,
    /// Create the remote parent of every file before uploading it, even if
    /// the walk already created it as a directory entry.
    pub ensure_parent: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            walk: WalkOptions::default(),
            ensure_parent: true,
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub directories: u64,
    pub files: u64,
    pub bytes: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl UploadSummary {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            directories: 0,
            files: 0,
            bytes: 0,
            started_at: now,
            finished_at: now,
        }
    }
}

/// Mirrors a local tree onto a [`RemoteFs`].
pub struct Uploader<'a, R: RemoteFs> {
    remote: &'a R,
    recorder: Box<dyn EventRecorder + 'a>,
    options: UploadOptions,
}

impl<'a, R: RemoteFs> Uploader<'a, R> {
    /// Creates an uploader reporting through a [`LogRecorder`].
    #[must_use]
    pub fn new(remote: &'a R, options: UploadOptions) -> Self {
        Self {
            remote,
            recorder: Box::new(LogRecorder::new(options.verbose)),
            options,
        }
    }

    /// Replaces the event recorder.
    #[must_use]
    pub fn with_recorder<E: EventRecorder + 'a>(mut self, recorder: E) -> Self {
        self.recorder = Box::new(recorder);
        self
    }

    /// Uploads every entry below `local_root` to `remote_root`.
    ///
    /// Fails before touching the remote side if `local_root` cannot be read.
    pub async fn upload<P: AsRef<Path>>(
        &self,
        local_root: P,
        remote_root: &str,
    ) -> Result<UploadSummary> {
        let local_root = local_root.as_ref();
        let result = self.run(local_root, remote_root).await;

        if let Err(err) = &result {
            self.recorder.record(&UploadEvent::Failed {
                message: err.to_string(),
            });
        }

        result
    }

    async fn run(&self, local_root: &Path, remote_root: &str) -> Result<UploadSummary> {
        if let Err(source) = std::fs::metadata(local_root) {
            return Err(Error::LocalRoot {
                path: local_root.to_path_buf(),
                source,
            });
        }

        let mut summary = UploadSummary::start();

        for entry in TreeWalker::new(local_root, self.options.walk) {
            let entry = entry?;
            let remote = map_to_remote(local_root, remote_root, entry.path());

            match entry {
                TreeEntry::Directory(_) => {
                    self.recorder.record(&UploadEvent::DirectoryStarted {
                        remote: remote.clone(),
                    });
                    self.remote
                        .create_dir_all(&remote)
                        .await
                        .map_err(|source| Error::CreateDir {
                            remote: remote.clone(),
                            source,
                        })?;

                    self.recorder
                        .record(&UploadEvent::DirectoryCreated { remote });
                    summary.directories += 1;
                }
                TreeEntry::File(local) => {
                    summary.bytes += self.upload_file(&local, &remote).await?;
                    summary.files += 1;
                }
            }
        }

        summary.finished_at = Utc::now();
        Ok(summary)
    }

    async fn upload_file(&self, local: &Path, remote: &str) -> Result<u64> {
        self.recorder.record(&UploadEvent::FileStarted {
            local: local.to_path_buf(),
            remote: remote.to_owned(),
        });

        if self.options.ensure_parent {
            self.remote
                .create_dir_all(remote_parent(remote))
                .await
                .map_err(|e| Error::transfer(UploadStep::CreateRemoteParent, local, remote, e))?;
        }

        let src = File::open(local)
            .await
            .map_err(|e| Error::transfer(UploadStep::OpenLocal, local, remote, e))?;

        let mut dst = self
            .remote
            .create_file(remote)
            .await
            .map_err(|e| Error::transfer(UploadStep::CreateRemoteFile, local, remote, e))?;

        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src);
        let copy = async {
            let bytes = io::copy_buf(&mut reader, &mut dst).await?;
            dst.shutdown().await?;
            Ok::<_, io::Error>(bytes)
        };
        let bytes = copy
            .await
            .map_err(|e| Error::transfer(UploadStep::Copy, local, remote, e))?;

        self.recorder.record(&UploadEvent::FileUploaded {
            remote: remote.to_owned(),
            bytes,
        });

        Ok(bytes)
    }
}

/// Uploads `local_root` to `remote_root` with default options.
pub async fn upload<R, P>(remote: &R, local_root: P, remote_root: &str) -> Result<UploadSummary>
where
    R: RemoteFs,
    P: AsRef<Path>,
{
    Uploader::new(remote, UploadOptions::default())
        .upload(local_root, remote_root)
        .await
}

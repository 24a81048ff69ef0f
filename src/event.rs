//! Progress reporting for an upload.
//!
//! The uploader never reads a global flag; it reports to whatever
//! [`EventRecorder`] it was given.

use log::Level;
use std::{
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    DirectoryStarted { remote: String },
    DirectoryCreated { remote: String },
    FileStarted { local: PathBuf, remote: String },
    FileUploaded { remote: String, bytes: u64 },
    Failed { message: String },
}

/// Receives upload events.
///
/// Recorders are shared with the upload future, which may move between
/// threads.
pub trait EventRecorder: Send + Sync {
    fn record(&self, event: &UploadEvent);
}

impl<T: EventRecorder + ?Sized> EventRecorder for &T {
    fn record(&self, event: &UploadEvent) {
        (**self).record(event);
    }
}

/// Forwards events to the `log` facade.
///
/// Progress goes out at `info` when verbose and at `debug` otherwise.
/// Failures are always logged at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder {
    verbose: bool,
}

impl LogRecorder {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    const fn level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

impl EventRecorder for LogRecorder {
    fn record(&self, event: &UploadEvent) {
        let level = self.level();
        match event {
            UploadEvent::DirectoryStarted { remote } => {
                log!(level, "Creating remote directory: {remote}");
            }
            UploadEvent::DirectoryCreated { remote } => trace!("created {remote}"),
            UploadEvent::FileStarted { local, remote } => {
                log!(level, "Uploading file: {} -> {remote}", local.display());
            }
            UploadEvent::FileUploaded { remote, bytes } => {
                log!(level, "Uploaded: {remote} ({bytes} bytes)");
            }
            UploadEvent::Failed { message } => error!("{message}"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<UploadEvent>>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<UploadEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event: &UploadEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

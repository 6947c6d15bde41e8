//! Append-only persistent log sessions
//!
//! A session is opened at the start of a cycle's write and closed before the
//! cycle ends. Nothing is held open between cycles, so a crash between cycles
//! can lose at most the record in flight.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{FieldLoggerError, Result};

/// Open-for-append handle over the persistent log.
pub trait LogSession {
    /// Append raw bytes to the end of the log.
    fn append(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush and release the handle.
    fn close(self) -> Result<()>;

    /// Drop everything this session appended and release the handle.
    ///
    /// Used after a failed append so a partial record never prefixes the
    /// next cycle's line.
    fn discard(self) -> Result<()>;
}

/// Persistent log that hands out one append session at a time.
pub trait LogStore {
    type Session: LogSession;

    /// Acquire an append session, creating the log if it does not exist.
    fn open_append(&mut self) -> Result<Self::Session>;
}

/// Log file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileStore {
    type Session = FileSession;

    fn open_append(&mut self) -> Result<FileSession> {
        let storage_error = |e: std::io::Error| {
            FieldLoggerError::Storage(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(storage_error)?;
            }
        }

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(storage_error)?;
        let start = file.metadata().map_err(storage_error)?.len();

        Ok(FileSession { file, start })
    }
}

/// Append session over an open log file
#[derive(Debug)]
pub struct FileSession {
    file: File,
    /// Log length when the session was opened
    start: u64,
}

impl FileSession {
    fn truncate_to_start(&mut self) -> std::io::Result<()> {
        self.file.set_len(self.start)
    }
}

impl LogSession for FileSession {
    /// A write that fails partway is cut back to the session start.
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if let Err(e) = self.file.write_all(bytes) {
            if let Err(trunc) = self.truncate_to_start() {
                warn!("Could not remove partial telemetry record: {}", trunc);
            }
            return Err(FieldLoggerError::Storage(format!("append failed: {}", e)));
        }
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.file
            .flush()
            .and_then(|_| self.file.sync_data())
            .map_err(|e| FieldLoggerError::Storage(format!("close failed: {}", e)))
    }

    fn discard(mut self) -> Result<()> {
        self.truncate_to_start()
            .map_err(|e| FieldLoggerError::Storage(format!("discard failed: {}", e)))
    }
}

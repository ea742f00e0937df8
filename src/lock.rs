//! File locking and atomic writes for the data directory
//!
//! - Exclusive advisory lock (fs2/flock) held for the whole of a
//!   read-modify-write against the key-value files
//! - Atomic write pattern (write temp + fsync + rename)
//! - Lock timeout with a retry interval

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Default retry interval when waiting for a lock
const LOCK_RETRY_INTERVAL_MS: u64 = 20;

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // On Windows, fs2 surfaces sharing/lock violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

/// A file lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, retrying until `timeout_ms` passes.
    ///
    /// The lock file is created if missing.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut file = open_lock_file(path)?;

        loop {
            file = match Self::lock_now(file)? {
                Ok(lock) => return Ok(lock),
                Err(file) => file,
            };
            if Instant::now() >= deadline {
                tracing::warn!(path = %path.display(), timeout_ms, "timed out waiting for lock");
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            std::thread::sleep(Duration::from_millis(LOCK_RETRY_INTERVAL_MS));
        }
    }

    /// One non-blocking attempt. Hands the file back when contended.
    fn lock_now(file: File) -> Result<std::result::Result<Self, File>> {
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Ok(FileLock { file })),
            Err(err) if is_lock_contended(&err) => Ok(Err(file)),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Replace the contents of `path` so readers see the old or the new bytes,
/// never a mix. Callers hold the data directory lock.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

//! Advisory whole-file locking.

use fs2::FileExt;
use std::fs::File;
use std::io;

/// Exclusive advisory lock held on an open file.
///
/// The lock belongs to the open file description, so two handles opened
/// separately (from different threads or processes) exclude each other.
/// Released on drop.
#[derive(Debug)]
pub(crate) struct FileLock {
    file: File,
}

impl FileLock {
    /// Blocks until an exclusive lock on `file` is granted.
    pub fn exclusive(file: File) -> io::Result<Self> {
        loop {
            match file.lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// The locked file.
    pub const fn file(&self) -> &File {
        &self.file
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock even if this fails.
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(error = %e, "Explicit unlock failed");
        }
    }
}

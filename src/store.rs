//! Physical file access under an exclusive lock.
//!
//! Every mutation is one read-modify-write cycle: lock, read the whole file,
//! compute the replacement, write it back, unlock.

use crate::error::Result;
use crate::lock::FileLock;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// How new content replaces the old.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Write a temporary sibling file and rename it over the target.
    /// Readers see either the old or the new file, never a mix.
    #[default]
    AtomicReplace,

    /// Truncate and rewrite the target through the locked handle.
    /// Required when the target is a bind mount, where `rename` over it
    /// fails with `EBUSY`.
    InPlace,
}

/// Runs `f` on the current content of `path` and stores what it returns.
///
/// The file is created if absent. The lock is held from before the read
/// until the new content is on disk and is released on every exit path.
pub(crate) fn with_lock<F>(path: &Path, mode: WriteMode, f: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<String>,
{
    let lock = acquire(path)?;
    let current = read_all(lock.file())?;
    let updated = f(&current)?;

    if updated == current {
        tracing::debug!(path = %path.display(), "Content unchanged, skipping write");
        return Ok(());
    }

    match mode {
        WriteMode::AtomicReplace => replace_atomic(path, lock.file(), updated.as_bytes())?,
        WriteMode::InPlace => rewrite_in_place(lock.file(), updated.as_bytes())?,
    }
    Ok(())
}

/// Returns the content of `path` as seen under the lock.
pub(crate) fn read_locked(path: &Path) -> Result<String> {
    let lock = acquire(path)?;
    Ok(read_all(lock.file())?)
}

/// Opens and locks `path`, retrying if the file was replaced while waiting.
fn acquire(path: &Path) -> Result<FileLock> {
    loop {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let lock = FileLock::exclusive(file)?;
        let held = lock.file().metadata()?;

        match std::fs::metadata(path) {
            Ok(current) if current.dev() == held.dev() && current.ino() == held.ino() => {
                return Ok(lock);
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(path = %path.display(), "File replaced while waiting for lock, retrying");
    }
}

fn read_all(mut file: &File) -> io::Result<String> {
    let mut content = String::new();
    file.rewind()?;
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn rewrite_in_place(mut file: &File, content: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.rewind()?;
    file.write_all(content)?;
    file.sync_all()
}

/// Renames new content over `target`. A symlinked target is resolved first
/// so the link keeps pointing at the updated file.
fn replace_atomic(target: &Path, locked: &File, content: &[u8]) -> io::Result<()> {
    let target = std::fs::canonicalize(target)?;
    let temp_path = temp_path_for(&target)?;
    let result = write_temp(&temp_path, locked, content)
        .and_then(|()| std::fs::rename(&temp_path, &target));

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "Failed to remove temporary hosts file"
                );
            }
        }
    }
    result
}

fn write_temp(temp_path: &Path, locked: &File, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(content)?;
    file.set_permissions(locked.metadata()?.permissions())?;
    file.sync_all()
}

/// `<dir>/.<name>.<pid>.tmp`, next to the target so `rename` stays on one
/// filesystem.
fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a file path: {}", target.display()),
        )
    })?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(format!(".{}.tmp", std::process::id()));
    Ok(target.with_file_name(temp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");

        with_lock(&path, WriteMode::AtomicReplace, |current| {
            assert_eq!(current, "");
            Ok("1.1.1.1\tone\n".to_string())
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.1.1.1\tone\n");
    }

    #[test]
    fn in_place_keeps_inode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "a much longer original content\n").unwrap();
        let before = std::fs::metadata(&path).unwrap().ino();

        with_lock(&path, WriteMode::InPlace, |_| Ok("short\n".to_string())).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().ino(), before);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short\n");
    }

    #[test]
    fn atomic_replace_keeps_permissions_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        with_lock(&path, WriteMode::AtomicReplace, |_| Ok("new\n".to_string())).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o640);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn closure_error_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "keep\n").unwrap();

        let err = with_lock(&path, WriteMode::AtomicReplace, |_| {
            Err(crate::HostsError::InvalidRecord("test".into()))
        });

        assert!(err.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep\n");
        // The lock was released: a second cycle does not block.
        assert_eq!(read_locked(&path).unwrap(), "keep\n");
    }

    #[test]
    fn atomic_replace_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("hosts.real");
        let link = dir.path().join("hosts");
        std::fs::write(&real, "old\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        with_lock(&link, WriteMode::AtomicReplace, |_| Ok("new\n".to_string())).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/etc/hosts")).unwrap();
        assert_eq!(temp.parent(), Some(Path::new("/etc")));
        assert_eq!(
            temp.file_name().unwrap().to_str().unwrap(),
            format!(".hosts.{}.tmp", std::process::id())
        );
        assert!(temp_path_for(Path::new("/")).is_err());
    }
}

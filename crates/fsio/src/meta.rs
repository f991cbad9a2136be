//! Metadata queries and restoration primitives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error produced when a filesystem capability fails.
#[derive(Debug, Error)]
#[error("failed to {context} '{}': {source}", path.display())]
pub struct MetaError {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MetaError {
    pub(crate) fn new(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the operation being performed when the error occurred.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        self.context
    }

    /// Returns the path involved in the failing operation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Returns the entry's modification time in Unix seconds.
///
/// Symbolic links report their own mtime, not the target's.
///
/// # Errors
///
/// Returns [`MetaError`] when the entry's metadata cannot be queried.
pub fn mtime_unix(path: &Path) -> Result<u64, MetaError> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|error| MetaError::new("query metadata of", path, error))?;
    Ok(mtime_from_metadata(&metadata))
}

#[cfg(unix)]
fn mtime_from_metadata(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;

    u64::try_from(metadata.mtime()).unwrap_or(0)
}

#[cfg(windows)]
fn mtime_from_metadata(metadata: &fs::Metadata) -> u64 {
    use std::os::windows::fs::MetadataExt;

    // FILETIME counts 100ns ticks since 1601-01-01; rebase onto the Unix
    // epoch before scaling down to seconds.
    const UNIX_EPOCH_FILETIME: u64 = 0x019D_B1DE_D53E_8000;
    const TICKS_PER_SECOND: u64 = 10_000_000;

    metadata
        .last_write_time()
        .saturating_sub(UNIX_EPOCH_FILETIME)
        / TICKS_PER_SECOND
}

#[cfg(not(any(unix, windows)))]
fn mtime_from_metadata(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Applies POSIX permission bits to `path`. No-op on platforms without them.
///
/// # Errors
///
/// Returns [`MetaError`] when the permissions cannot be changed.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<(), MetaError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|error| MetaError::new("set permissions on", path, error))
}

/// Applies POSIX permission bits to `path`. No-op on platforms without them.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<(), MetaError> {
    Ok(())
}

/// Creates a directory; an already existing directory is not an error.
///
/// # Errors
///
/// Returns [`MetaError`] for any failure other than the directory already
/// existing.
pub fn create_directory(path: &Path) -> Result<(), MetaError> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(error) => Err(MetaError::new("create directory", path, error)),
    }
}

/// Creates a symbolic link at `link` pointing to `target`.
///
/// # Errors
///
/// Returns [`MetaError`] when the link cannot be created, including on
/// platforms without symbolic links.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), MetaError> {
    symlink_impl(target, link).map_err(|error| MetaError::new("create symlink at", link, error))
}

#[cfg(unix)]
fn symlink_impl(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_impl(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_impl(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Creates a hard link at `link` referring to `target`.
///
/// # Errors
///
/// Returns [`MetaError`] when the link cannot be created.
pub fn create_hardlink(target: &Path, link: &Path) -> Result<(), MetaError> {
    fs::hard_link(target, link)
        .map_err(|error| MetaError::new("create hard link at", link, error))
}

#[cfg(test)]
mod tests {
    use super::{create_directory, mtime_unix, MetaError};
    use std::io;
    use std::path::Path;

    #[test]
    fn mtime_of_a_fresh_file_is_recent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("stamp.txt");
        std::fs::write(&file, b"tick").expect("write file");

        let mtime = mtime_unix(&file).expect("query mtime");
        // Well past 2001-09-09 and not in the far future.
        assert!(mtime > 1_000_000_000);
    }

    #[test]
    fn missing_path_reports_context() {
        let error = mtime_unix(Path::new("/definitely/not/here")).expect_err("must fail");
        assert_eq!(error.context(), "query metadata of");
        assert!(error.path().ends_with("here"));
    }

    #[test]
    fn create_directory_tolerates_existing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let target = dir.path().join("nested");
        create_directory(&target).expect("first create");
        create_directory(&target).expect("second create is not an error");
    }

    #[test]
    fn error_display_names_the_operation() {
        let error = MetaError::new(
            "set permissions on",
            Path::new("/tmp/file"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let rendered = error.to_string();
        assert!(rendered.contains("set permissions on"));
        assert!(rendered.contains("/tmp/file"));
    }
}

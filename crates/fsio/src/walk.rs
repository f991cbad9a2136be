//! Deterministic depth-first filesystem traversal.
//!
//! The walker enumerates regular files, directories, and symbolic links in a
//! stable order: directory contents are sorted lexicographically before they
//! are yielded, and a directory entry always precedes its contents so an
//! archive writer can emit members in a valid order. Symbolic links are
//! reported as themselves and never followed.

use std::error::Error;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configures a traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    include_root: bool,
}

impl WalkBuilder {
    /// Creates a builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            include_root: false,
        }
    }

    /// Controls whether the root entry itself is yielded first.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Builds a [`Walker`] using the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError`] when the root's metadata or directory listing
    /// cannot be read.
    pub fn build(self) -> Result<Walker, WalkError> {
        let metadata = fs::symlink_metadata(&self.root)
            .map_err(|error| WalkError::new("query metadata of", self.root.clone(), error))?;

        let mut stack = Vec::new();
        if metadata.is_dir() {
            stack.push(DirState::read(self.root.clone(), PathBuf::new(), 0)?);
        }

        Ok(Walker {
            root: self.root,
            pending_root: self.include_root.then_some(metadata),
            stack,
        })
    }
}

/// One step of a traversal.
#[derive(Debug)]
pub struct WalkEntry {
    full_path: PathBuf,
    relative_path: PathBuf,
    metadata: fs::Metadata,
    depth: usize,
}

impl WalkEntry {
    /// Returns the filesystem path of the entry.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Returns the path relative to the traversal root (empty for the root
    /// itself).
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Provides access to the metadata captured for the entry.
    ///
    /// Metadata is captured with `symlink_metadata`, so symbolic links
    /// describe themselves.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Depth below the root; the root entry is depth `0`.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug)]
struct DirState {
    fs_path: PathBuf,
    relative: PathBuf,
    entries: std::vec::IntoIter<OsString>,
    depth: usize,
}

impl DirState {
    fn read(fs_path: PathBuf, relative: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let mut names = Vec::new();
        let listing = fs::read_dir(&fs_path)
            .map_err(|error| WalkError::new("read directory", fs_path.clone(), error))?;
        for entry in listing {
            let entry = entry
                .map_err(|error| WalkError::new("read directory", fs_path.clone(), error))?;
            names.push(entry.file_name());
        }
        names.sort();
        tracing::trace!(directory = %fs_path.display(), entries = names.len(), "entering directory");
        Ok(Self {
            fs_path,
            relative,
            entries: names.into_iter(),
            depth,
        })
    }
}

/// Depth-first iterator over filesystem entries.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    pending_root: Option<fs::Metadata>,
    stack: Vec<DirState>,
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(metadata) = self.pending_root.take() {
            return Some(Ok(WalkEntry {
                full_path: self.root.clone(),
                relative_path: PathBuf::new(),
                metadata,
                depth: 0,
            }));
        }

        loop {
            let state = self.stack.last_mut()?;
            let Some(name) = state.entries.next() else {
                self.stack.pop();
                continue;
            };

            let full_path = state.fs_path.join(&name);
            let relative_path = state.relative.join(&name);
            let depth = state.depth + 1;

            let metadata = match fs::symlink_metadata(&full_path) {
                Ok(metadata) => metadata,
                Err(error) => {
                    return Some(Err(WalkError::new("query metadata of", full_path, error)));
                }
            };

            if metadata.is_dir() {
                match DirState::read(full_path.clone(), relative_path.clone(), depth) {
                    Ok(child) => self.stack.push(child),
                    Err(error) => return Some(Err(error)),
                }
            }

            return Some(Ok(WalkEntry {
                full_path,
                relative_path,
                metadata,
                depth,
            }));
        }
    }
}

/// I/O failure encountered while traversing, with the offending path.
#[derive(Debug)]
pub struct WalkError {
    context: &'static str,
    path: PathBuf,
    source: io::Error,
}

impl WalkError {
    fn new(context: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self {
            context,
            path,
            source,
        }
    }

    /// Returns the path involved in the failing operation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to {} '{}': {}",
            self.context,
            self.path.display(),
            self.source
        )
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::WalkBuilder;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn collect_relative(root: &Path) -> Vec<PathBuf> {
        WalkBuilder::new(root)
            .build()
            .expect("build walker")
            .map(|entry| entry.expect("walk entry").relative_path().to_path_buf())
            .collect()
    }

    #[test]
    fn traversal_is_sorted_and_directories_precede_contents() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir(root.join("sub")).expect("create dir");
        fs::write(root.join("sub/inner.txt"), b"x").expect("write file");
        fs::write(root.join("b.txt"), b"x").expect("write file");
        fs::write(root.join("a.txt"), b"x").expect("write file");

        let seen = collect_relative(root);
        assert_eq!(
            seen,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub"),
                PathBuf::from("sub/inner.txt"),
            ]
        );
    }

    #[test]
    fn include_root_yields_the_root_first() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut walker = WalkBuilder::new(temp.path())
            .include_root(true)
            .build()
            .expect("build walker");

        let root = walker.next().expect("root entry").expect("no error");
        assert!(root.relative_path().as_os_str().is_empty());
        assert_eq!(root.depth(), 0);
        assert!(root.metadata().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_reported_but_not_followed() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir(root.join("real")).expect("create dir");
        fs::write(root.join("real/file.txt"), b"x").expect("write file");
        std::os::unix::fs::symlink(root.join("real"), root.join("alias"))
            .expect("create symlink");

        let seen = collect_relative(root);
        assert!(seen.contains(&PathBuf::from("alias")));
        assert!(!seen.contains(&PathBuf::from("alias/file.txt")));
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = WalkBuilder::new("/definitely/not/here").build();
        assert!(result.is_err());
    }
}

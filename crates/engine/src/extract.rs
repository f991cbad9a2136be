//! `.tar.gz` extraction with mandatory path-safety checks.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use oxtar_compress::GzipReader;
use oxtar_fsio::meta;
use oxtar_ustar::{TypeFlag, UstarMember, UstarReader};

use crate::error::EngineError;

/// Options controlling an extraction.
#[derive(Clone, Debug)]
pub struct ExpandOptions {
    destination: PathBuf,
    input_name: String,
    strip_components: u32,
}

impl ExpandOptions {
    /// Creates options extracting into `destination` with no stripping.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(destination: P) -> Self {
        Self {
            destination: destination.into(),
            input_name: String::new(),
            strip_components: 0,
        }
    }

    /// Sets the archive name used in diagnostics. Defaults to the input
    /// path when extracting from a file.
    #[must_use]
    pub fn input_name<S: Into<String>>(mut self, name: S) -> Self {
        self.input_name = name.into();
        self
    }

    /// Drops the first `count` path elements of every member. Members with
    /// no elements left are skipped.
    #[must_use]
    pub const fn strip_components(mut self, count: u32) -> Self {
        self.strip_components = count;
        self
    }
}

/// Extracts a gzip-compressed tar file into the destination directory.
///
/// # Errors
///
/// Returns [`EngineError`] on the first failing member; files extracted
/// before the failure remain on disk.
pub fn expand_directory_targz(options: &ExpandOptions, archive: &Path) -> Result<(), EngineError> {
    let input = File::open(archive)?;
    let name = if options.input_name.is_empty() {
        archive.display().to_string()
    } else {
        options.input_name.clone()
    };
    expand(options, &name, BufReader::new(input))
}

/// Extracts a gzip-compressed tar stream into the destination directory.
///
/// # Errors
///
/// Returns [`EngineError`] on the first failing member; files extracted
/// before the failure remain on disk.
pub fn expand_directory_targz_from_reader<R: Read>(
    options: &ExpandOptions,
    input: R,
) -> Result<(), EngineError> {
    expand(options, &options.input_name, input)
}

fn expand<R: Read>(
    options: &ExpandOptions,
    archive_name: &str,
    input: R,
) -> Result<(), EngineError> {
    let gzip = GzipReader::new(input);
    let mut archive = UstarReader::new(gzip);

    while let Some(member) = archive.next_member()? {
        extract_member(options, archive_name, &mut archive, &member)?;
    }
    Ok(())
}

fn extract_member<R: Read>(
    options: &ExpandOptions,
    archive_name: &str,
    archive: &mut UstarReader<GzipReader<R>>,
    member: &UstarMember,
) -> Result<(), EngineError> {
    let member_name = member.full_name();
    let raw = PathBuf::from(&member_name);

    let element_count = raw.components().count();
    if options.strip_components as usize >= element_count {
        tracing::warn!(
            member = %member_name,
            strip = options.strip_components,
            "skipping member consumed by strip_components"
        );
        return Ok(());
    }

    let normalized = lexical_normalize(&raw);
    if normalized.as_os_str().is_empty() {
        return Err(EngineError::EmptyMemberName {
            archive: archive_name.to_string(),
        });
    }
    if normalized.has_root() || normalized.is_absolute() {
        return Err(EngineError::UnsafePath {
            archive: archive_name.to_string(),
            member: member_name,
        });
    }
    if matches!(normalized.components().next(), Some(Component::ParentDir)) {
        return Err(EngineError::UnsafePath {
            archive: archive_name.to_string(),
            member: member_name,
        });
    }

    let stripped: PathBuf = raw
        .components()
        .skip(options.strip_components as usize)
        .collect();
    let target = lexical_normalize(&options.destination.join(stripped));
    tracing::debug!(member = %member_name, target = %target.display(), "extracting member");

    match member.typeflag {
        TypeFlag::Directory => {
            meta::create_directory(&target)?;
        }
        TypeFlag::Symlink => {
            let link_target = member.linkname().into_owned();
            meta::create_symlink(Path::new(&link_target), &target)?;
        }
        TypeFlag::HardLink => {
            let link_target = member.linkname().into_owned();
            meta::create_hardlink(Path::new(&link_target), &target)?;
        }
        TypeFlag::Regular | TypeFlag::HpcFile => {
            let mut output = File::create(&target)?;
            io::copy(&mut archive.data(), &mut output)?;
            meta::set_mode(&target, member.mode)?;
        }
        TypeFlag::PaxExtended | TypeFlag::PaxGlobal => {
            // Recognised but carrying nothing we restore; the reader drains
            // the payload on the next header.
            tracing::trace!(member = %member_name, "skipping pax record");
        }
        other => {
            return Err(EngineError::UnsupportedMemberType {
                archive: archive_name.to_string(),
                member: member_name,
                type_flag: other.as_byte() as char,
            });
        }
    }
    Ok(())
}

/// Collapses `.` and `..` elements without touching the filesystem.
///
/// A `..` at the start (nothing to pop) is preserved so callers can detect
/// escapes; a `..` directly under the root collapses into the root.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    let mut normalized = PathBuf::new();
    for part in parts {
        normalized.push(part.as_os_str());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::lexical_normalize;
    use std::path::{Path, PathBuf};

    #[test]
    fn dot_elements_collapse() {
        assert_eq!(
            lexical_normalize(Path::new("a/./b/../c")),
            PathBuf::from("a/c")
        );
        assert_eq!(lexical_normalize(Path::new("./a/")), PathBuf::from("a"));
    }

    #[test]
    fn leading_parent_dirs_survive_normalisation() {
        assert_eq!(
            lexical_normalize(Path::new("../escape")),
            PathBuf::from("../escape")
        );
        assert_eq!(
            lexical_normalize(Path::new("a/../../escape")),
            PathBuf::from("../escape")
        );
    }

    #[test]
    fn a_name_that_cancels_out_is_empty() {
        assert_eq!(lexical_normalize(Path::new("a/..")), PathBuf::new());
        assert_eq!(lexical_normalize(Path::new(".")), PathBuf::new());
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_stay_absolute() {
        assert_eq!(
            lexical_normalize(Path::new("/etc/../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
        assert!(lexical_normalize(Path::new("/..")).has_root());
    }
}

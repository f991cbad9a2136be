//! Directory to `.tar.gz` packing.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use oxtar_compress::{CompressionLevel, GzipWriter};
use oxtar_fsio::WalkBuilder;
use oxtar_ustar::UstarWriter;

use crate::error::EngineError;

/// Archives the contents of `directory` into a gzip-compressed tar at
/// `destination`.
///
/// Entries are enumerated depth-first in sorted order with paths recorded
/// relative to `directory`, so the same tree produces the same archive on
/// every platform. The root directory itself is not a member.
///
/// # Errors
///
/// Returns [`EngineError`] when traversal, archiving, compression, or the
/// destination file fails. A partially written destination is left on disk.
pub fn compress_directory_targz(directory: &Path, destination: &Path) -> Result<(), EngineError> {
    let root = fs::canonicalize(directory)?;
    let output = File::create(destination)?;
    let gzip = GzipWriter::new(BufWriter::new(output), CompressionLevel::Default);
    let mut archive = UstarWriter::new(gzip);

    let walker = WalkBuilder::new(&root).include_root(false).build()?;
    for entry in walker {
        let entry = entry?;
        let member_name = slash_separated(entry.relative_path());
        tracing::debug!(member = %member_name, "adding archive member");
        archive.add_file(&member_name, entry.full_path())?;
    }

    archive.finish()?;
    archive.into_inner().finish()?;
    Ok(())
}

/// Renders a relative path with `/` separators regardless of platform.
fn slash_separated(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

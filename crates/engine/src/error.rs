//! Errors raised by the directory pack/extract pipeline.

use std::io;

use thiserror::Error;

use oxtar_fsio::{MetaError, WalkError};
use oxtar_ustar::TarError;

/// Errors that can occur while packing or extracting a `.tar.gz`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// I/O failure from the archive file or an extracted file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Failure while traversing the directory being packed.
    #[error(transparent)]
    Walk(#[from] WalkError),
    /// Failure from a filesystem capability during extraction.
    #[error(transparent)]
    Meta(#[from] MetaError),
    /// Failure from the archive codec or reader/writer.
    #[error(transparent)]
    Archive(#[from] TarError),
    /// A member's composed name normalises to nothing.
    #[error("archive '{archive}' contains a member with an empty name")]
    EmptyMemberName {
        /// Display name of the archive being extracted.
        archive: String,
    },
    /// Extracting the member would write outside the destination directory.
    #[error(
        "archive '{archive}' member '{member}' would extract outside the destination directory"
    )]
    UnsafePath {
        /// Display name of the archive being extracted.
        archive: String,
        /// Name of the offending member.
        member: String,
    },
    /// The member's typeflag has no extraction behaviour.
    #[error("archive '{archive}' member '{member}' has unsupported type flag '{type_flag}'")]
    UnsupportedMemberType {
        /// Display name of the archive being extracted.
        archive: String,
        /// Name of the offending member.
        member: String,
        /// The unhandled typeflag byte, as a character.
        type_flag: char,
    },
}

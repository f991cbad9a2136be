//! Errors raised by the archive codec and the reader/writer.

use std::io;

use thiserror::Error;

use oxtar_fsio::MetaError;

/// Errors that can occur while reading or writing a ustar archive.
#[derive(Debug, Error)]
pub enum TarError {
    /// I/O failure from the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Filesystem capability failure while adding a file.
    #[error(transparent)]
    Meta(#[from] MetaError),
    /// The magic/version slice is neither the POSIX nor the GNU constant.
    #[error("invalid magic in ustar header")]
    InvalidMagic,
    /// An octal field contains non-octal bytes or overflows.
    #[error("invalid octal value in ustar header field '{field}'")]
    InvalidOctal {
        /// Name of the malformed field.
        field: &'static str,
    },
    /// The stored header checksum disagrees with the computed one.
    #[error("ustar header checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        /// Value parsed from the chksum field.
        stored: u64,
        /// Unsigned sum of the record with the chksum field as spaces.
        computed: u64,
    },
    /// The archive ended inside a 512-byte header record.
    #[error("archive ended in the middle of a header record")]
    TruncatedHeader,
    /// A numeric value does not fit its octal header field.
    #[error("value {value} does not fit the ustar header field '{field}'")]
    FieldOverflow {
        /// Name of the overflowing field.
        field: &'static str,
        /// Value that was supposed to be encoded.
        value: u64,
    },
    /// A string is longer than its fixed-width header field.
    #[error("{field} of {len} bytes exceeds the ustar limit of {capacity}")]
    FieldTooLong {
        /// Name of the overflowing field.
        field: &'static str,
        /// Length of the rejected string.
        len: usize,
        /// Capacity of the header field.
        capacity: usize,
    },
    /// Member data written does not match the size declared in its header.
    #[error("member data of {written} bytes does not match the declared size of {declared}")]
    SizeMismatch {
        /// Size recorded in the member header.
        declared: u64,
        /// Bytes actually written for the member.
        written: u64,
    },
    /// More bytes were consumed from a member than it has left.
    #[error("attempted to consume {requested} bytes with only {available} left in the member")]
    ConsumeBeyondMember {
        /// Bytes the caller asked to consume.
        requested: u64,
        /// Bytes remaining in the current member.
        available: u64,
    },
    /// The entry cannot be represented in a ustar archive.
    #[error("unsupported archive input: {0}")]
    Unsupported(String),
}

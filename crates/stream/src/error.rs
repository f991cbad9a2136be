//! Error kinds raised by codec steps.

use thiserror::Error;

/// Integrity failure detected while decoding a stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CorruptionKind {
    /// The running CRC-32 of the decoded payload disagrees with the stored
    /// trailer value.
    CrcMismatch,
    /// The decoded payload length disagrees with the stored trailer value.
    LengthMismatch,
    /// The underlying DEFLATE engine rejected the compressed data.
    Deflate,
}

impl CorruptionKind {
    fn describe(self) -> &'static str {
        match self {
            Self::CrcMismatch => "crc-32 of the decoded payload does not match the stream trailer",
            Self::LengthMismatch => "decoded payload length does not match the stream trailer",
            Self::Deflate => "compressed data was rejected by the deflate engine",
        }
    }
}

/// Errors surfaced by a codec step.
///
/// Codecs never retry internally; every failure is reported to the immediate
/// caller and leaves the codec in a state where only `reset` is meaningful.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CodecError {
    /// The input does not match the expected wire format.
    #[error("invalid stream format: {0}")]
    InvalidFormat(String),
    /// A data-integrity check failed at stream end.
    #[error("corrupted input: {}", .0.describe())]
    Corrupted(CorruptionKind),
    /// The codec was used in a way its lifecycle forbids.
    #[error("codec misuse: {0}")]
    InvalidState(&'static str),
    /// A bounded header field exceeds the supported capture capacity.
    #[error("{field} of {requested} bytes exceeds the supported capacity of {limit}")]
    CapacityExceeded {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum number of bytes the codec captures for the field.
        limit: usize,
        /// Length declared by the stream.
        requested: usize,
    },
    /// A step made no progress although it had room to. This indicates a bug
    /// in the codec being driven, surfaced instead of looping forever.
    #[error("codec made no progress with non-empty buffers")]
    Stalled,
}

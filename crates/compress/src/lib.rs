#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_compress` implements the compression half of the oxtar workspace:
//! a DEFLATE adapter over [`flate2`](https://docs.rs/flate2) and a resumable
//! gzip framing codec around it. Every codec follows the buffer-transformer
//! contract from [`oxtar_stream`], so arbitrarily small input and output
//! buffers can be supplied at any step without losing progress.
//!
//! # Design
//!
//! - [`DeflateCompressor`] and [`InflateDecompressor`] translate the step
//!   contract onto `flate2`'s in-memory `Compress`/`Decompress` engines,
//!   producing and consuming raw deflate streams with no framing of their
//!   own.
//! - [`GzipCompressor`] and [`GzipDecompressor`] are explicit state machines
//!   over the gzip wire format. Each header and trailer field is a distinct
//!   state with its own cursor; the inner DEFLATE step is a sub-state. The
//!   wrappers are generic over the inner codec and accept either an owned
//!   instance or a `&mut` borrow.
//! - [`GzipWriter`] and [`GzipReader`] adapt the codecs to `std::io::Write`
//!   and `std::io::Read` for pipeline composition, mirroring the counting
//!   encoder/decoder shape used elsewhere in the workspace.
//!
//! # Errors
//!
//! Codec steps return [`CodecError`](oxtar_stream::CodecError): format
//! violations, capacity overruns on bounded header fields, integrity
//! failures at stream end, and lifecycle misuse. The I/O adapters wrap codec
//! errors in [`std::io::Error`] with kind `InvalidData`.
//!
//! # Examples
//!
//! Round-trip a payload through the one-shot helpers:
//!
//! ```
//! use oxtar_compress::{compress_gzip, decompress_gzip};
//!
//! let mut encoded = Vec::new();
//! let progress = compress_gzip(&mut encoded, b"Hello!").unwrap();
//! assert!(progress.done);
//! assert_eq!(progress.bytes_read, 6);
//!
//! let mut decoded = Vec::new();
//! decompress_gzip(&mut decoded, &encoded).unwrap();
//! assert_eq!(decoded, b"Hello!");
//! ```

mod deflate;
mod gzip;
mod io;
mod level;

pub use deflate::{
    compress_deflate, decompress_inflate, DeflateCompressor, InflateDecompressor,
};
pub use gzip::{
    compress_gzip, decompress_gzip, GzipCompressor, GzipDecompressor, GzipDeflateCompressor,
    GzipHeader, GzipInflateDecompressor,
};
pub use io::{GzipReader, GzipWriter};
pub use level::{CompressionLevel, CompressionLevelError};

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_engine` composes the workspace's codecs into end-to-end `.tar.gz`
//! pipelines: packing walks a directory into a tar stream that is gzip
//! compressed on the way to disk, and extraction inflates an archive and
//! replays its members onto the filesystem.
//!
//! # Design
//!
//! The pipelines are plain `std::io` composition over the streaming layers:
//!
//! ```text
//! pack:    walk -> UstarWriter -> GzipWriter -> File
//! extract: File -> GzipReader -> UstarReader -> filesystem
//! ```
//!
//! Every member is vetted before any filesystem action: its composed name
//! is lexically normalised, and empty, absolute, or destination-escaping
//! names abort the extraction. `strip_components` is applied to the raw
//! name, and members it consumes entirely are skipped with a warning.
//!
//! # Errors
//!
//! Extraction stops at the first failing member and reports it as an
//! [`EngineError`]; already-extracted files are left in place for
//! inspection. Callers that need transactional behaviour should extract
//! into a staging directory.

mod error;
mod extract;
mod pack;

pub use error::EngineError;
pub use extract::{expand_directory_targz, expand_directory_targz_from_reader, ExpandOptions};
pub use pack::compress_directory_targz;

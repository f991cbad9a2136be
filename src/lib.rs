#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar` is a streaming compression and archive toolkit: resumable DEFLATE
//! and gzip codecs, a ustar (POSIX tar) reader and writer, and end-to-end
//! `.tar.gz` directory packing and extraction. This crate is the facade; the
//! implementation lives in the workspace's single-concern crates and is
//! re-exported here.
//!
//! Every codec follows one contract: a step consumes any prefix of a
//! bounded input buffer, produces any prefix of a bounded output buffer,
//! and can be resumed with different buffers at any point. That makes the
//! layers composable — the gzip codec wraps any DEFLATE-shaped codec, the
//! tar layer reads from any byte source, and the directory pipelines are
//! plain `std::io` composition.
//!
//! # Examples
//!
//! Round-trip bytes through gzip:
//!
//! ```
//! use oxtar::{compress_gzip, decompress_gzip};
//!
//! let mut encoded = Vec::new();
//! compress_gzip(&mut encoded, b"Hello!").unwrap();
//!
//! let mut decoded = Vec::new();
//! let progress = decompress_gzip(&mut decoded, &encoded).unwrap();
//! assert!(progress.done);
//! assert_eq!(decoded, b"Hello!");
//! ```
//!
//! Write and read a tar archive in memory:
//!
//! ```
//! use std::io::Cursor;
//! use oxtar::{UstarMember, UstarReader, UstarWriter};
//!
//! # fn demo() -> Result<(), oxtar::TarError> {
//! let mut member = UstarMember::default();
//! member.set_filename("hello.txt")?;
//! member.size = 5;
//!
//! let mut writer = UstarWriter::new(Vec::new());
//! writer.write_member(&member, b"howdy")?;
//! writer.finish()?;
//!
//! let mut reader = UstarReader::new(Cursor::new(writer.into_inner()));
//! let decoded = reader.next_member()?.expect("one member");
//! assert_eq!(decoded.filename(), "hello.txt");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```
//!
//! Pack and extract a directory:
//!
//! ```no_run
//! use oxtar::{compress_directory_targz, expand_directory_targz, ExpandOptions};
//! use std::path::Path;
//!
//! # fn demo() -> Result<(), oxtar::EngineError> {
//! compress_directory_targz(Path::new("project"), Path::new("project.tar.gz"))?;
//! let options = ExpandOptions::new("unpacked").strip_components(0);
//! expand_directory_targz(&options, Path::new("project.tar.gz"))?;
//! # Ok(())
//! # }
//! ```

pub use oxtar_checksums::Crc32;
pub use oxtar_compress::{
    compress_deflate, compress_gzip, decompress_gzip, decompress_inflate, CompressionLevel,
    CompressionLevelError, DeflateCompressor, GzipCompressor, GzipDecompressor,
    GzipDeflateCompressor, GzipHeader, GzipInflateDecompressor, GzipReader, GzipWriter,
    InflateDecompressor,
};
pub use oxtar_engine::{
    compress_directory_targz, expand_directory_targz, expand_directory_targz_from_reader,
    EngineError, ExpandOptions,
};
pub use oxtar_fsio::{meta, walk, MetaError, WalkBuilder, WalkEntry, WalkError, Walker};
pub use oxtar_stream::{
    drive, CodecError, Compressor, CorruptionKind, Decompressor, FlushMode, InputBuf, OutputBuf,
    Progress,
};
pub use oxtar_ustar::{
    DecodedHeader, HeaderDecoder, HeaderEncoder, MemberData, Members, TarError, TypeFlag,
    UstarMember, UstarReader, UstarWriter, BLOCK_SIZE,
};

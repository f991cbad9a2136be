#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_ustar` reads and writes ustar (POSIX tar) archives as streams: a
//! resumable codec for the 512-byte header record, a reader that walks
//! members over any [`Read`](std::io::Read) source, and a writer that emits
//! members into any [`Write`](std::io::Write) sink. Payloads are never
//! buffered whole; the reader exposes bounded views over the current
//! member's data and the writer streams from any reader.
//!
//! # Design
//!
//! - [`HeaderDecoder`] and [`HeaderEncoder`] assemble and emit one record
//!   across arbitrarily small buffers; all octal field handling lives there.
//! - [`UstarReader`] tracks the unconsumed payload and block padding of the
//!   current member and drains both before decoding the next header. The
//!   all-zero record terminates iteration.
//! - [`UstarWriter`] tracks payload bytes per member, pads to record
//!   boundaries, and finishes the archive with two zero records.
//!   [`UstarWriter::add_file`] archives filesystem entries via the
//!   capability layer in [`oxtar_fsio`].
//!
//! # Examples
//!
//! Write a member and read it back:
//!
//! ```
//! use std::io::Cursor;
//! use oxtar_ustar::{UstarMember, UstarReader, UstarWriter};
//!
//! # fn demo() -> Result<(), oxtar_ustar::TarError> {
//! let mut member = UstarMember::default();
//! member.set_filename("test.txt")?;
//! member.size = 5;
//!
//! let mut writer = UstarWriter::new(Vec::new());
//! writer.write_member(&member, b"howdy")?;
//! writer.finish()?;
//!
//! let mut reader = UstarReader::new(Cursor::new(writer.into_inner()));
//! let decoded = reader.next_member()?.expect("one member");
//! assert_eq!(decoded.filename(), "test.txt");
//! assert_eq!(reader.all_data()?, b"howdy");
//! assert!(reader.next_member()?.is_none());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;
mod header;
mod member;
mod reader;
mod writer;

pub use error::TarError;
pub use header::{DecodedHeader, HeaderDecoder, HeaderEncoder, BLOCK_SIZE};
pub use member::{TypeFlag, UstarMember};
pub use reader::{MemberData, Members, UstarReader};
pub use writer::UstarWriter;

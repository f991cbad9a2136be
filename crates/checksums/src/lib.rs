#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_checksums` provides the incremental CRC-32 that the gzip framing
//! codec feeds while streaming. The checksum uses the canonical IEEE
//! reflected polynomial so the values written into gzip trailers match every
//! conforming implementation.
//!
//! # Invariants
//!
//! - Feeding a byte string in arbitrary splits produces the same value as
//!   feeding it whole.
//! - The lookup table is computed at compile time and shared immutably by
//!   every checksum instance.
//!
//! # Examples
//!
//! ```
//! use oxtar_checksums::Crc32;
//!
//! let mut crc = Crc32::new();
//! crc.update(b"The quick brown fox ");
//! crc.update(b"jumps over the lazy dog");
//! assert_eq!(crc.value(), 0x414F_A339);
//! ```

mod crc32;

pub use crc32::Crc32;

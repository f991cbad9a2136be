#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_stream` defines the buffer-transformer contract shared by every
//! codec in the oxtar workspace: the DEFLATE adapter, the gzip framing codec,
//! and the ustar header codec all expose the same resumable step shape. A
//! step consumes any prefix of a bounded input buffer, produces any prefix of
//! a bounded output buffer, and reports its progress so callers can suspend
//! and resume a logical stream across arbitrarily small buffers.
//!
//! # Design
//!
//! - [`InputBuf`] and [`OutputBuf`] are cursored views over caller-owned byte
//!   ranges. They own no storage and are advanced in place as a codec makes
//!   progress.
//! - [`Compressor`] and [`Decompressor`] are the step traits. Both carry an
//!   infallible `reset` so instances can be reused between streams. Blanket
//!   implementations for `&mut T` let a wrapping codec either own or borrow
//!   its inner codec.
//! - [`Progress`] accumulates componentwise; `done` is sticky under addition.
//! - The driver loops in [`drive`] repeatedly invoke a codec over growing or
//!   segmented destinations until the stream completes, input runs dry, or
//!   output space is exhausted.
//!
//! # Invariants
//!
//! - A step must advance the input or the output on every call unless both
//!   buffers are empty or the codec has already finished. The drivers convert
//!   a violation into [`CodecError::Stalled`] instead of spinning.
//! - Once a codec reports `done`, feeding it further input is a caller error
//!   ([`CodecError::InvalidState`]); `reset` restores the initial state
//!   unconditionally.
//!
//! # Examples
//!
//! Drive a trivial pass-through codec into a dynamically grown buffer:
//!
//! ```
//! use oxtar_stream::{
//!     drive, Compressor, CodecError, FlushMode, InputBuf, OutputBuf, Progress,
//! };
//!
//! struct Passthrough {
//!     finished: bool,
//! }
//!
//! impl Compressor for Passthrough {
//!     fn compress(
//!         &mut self,
//!         out: &mut OutputBuf<'_>,
//!         input: &mut InputBuf<'_>,
//!         flush: FlushMode,
//!     ) -> Result<Progress, CodecError> {
//!         let copied = input.copy_to(out) as u64;
//!         if flush == FlushMode::Finish && input.is_empty() {
//!             self.finished = true;
//!         }
//!         Ok(Progress {
//!             bytes_written: copied,
//!             bytes_read: copied,
//!             done: self.finished,
//!         })
//!     }
//!
//!     fn reset(&mut self) {
//!         self.finished = false;
//!     }
//! }
//!
//! let mut codec = Passthrough { finished: false };
//! let mut out = Vec::new();
//! let progress =
//!     drive::compress_into(&mut codec, &mut out, b"payload", FlushMode::Finish).unwrap();
//! assert!(progress.done);
//! assert_eq!(out, b"payload");
//! ```

mod buf;
mod codec;
mod error;
mod progress;

pub mod drive;

pub use buf::{InputBuf, OutputBuf};
pub use codec::{Compressor, Decompressor};
pub use error::{CodecError, CorruptionKind};
pub use progress::{FlushMode, Progress};

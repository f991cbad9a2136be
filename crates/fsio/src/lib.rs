#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `oxtar_fsio` is the small filesystem capability surface the archive layer
//! builds on: modification-time queries, permission and link restoration,
//! and a deterministic recursive walk. Keeping these behind one crate keeps
//! the platform-specific pieces (POSIX `st_mtime`, Windows `FILETIME`
//! conversion, mode bits) out of the codecs and the pipeline.
//!
//! # Design
//!
//! - [`meta`] exposes one function per capability; each failure is reported
//!   as a [`MetaError`](meta::MetaError) carrying the operation and the
//!   offending path.
//! - [`walk`] yields entries depth-first with directory contents sorted
//!   lexicographically, so archive layouts are reproducible across
//!   platforms. Symbolic links are reported but never followed.

pub mod meta;
pub mod walk;

pub use meta::MetaError;
pub use walk::{WalkBuilder, WalkEntry, WalkError, Walker};

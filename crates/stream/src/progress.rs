//! Progress accounting shared by the compress and decompress directions.

use core::ops::{Add, AddAssign};

/// Outcome of a single codec step, or a sum of steps.
///
/// Addition is componentwise and `done` is sticky: once any summand has
/// reported the terminal output, the total stays terminal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Progress {
    /// Bytes produced into the destination.
    pub bytes_written: u64,
    /// Bytes consumed from the source.
    pub bytes_read: u64,
    /// The transformer has emitted its terminal output and will produce no
    /// more.
    pub done: bool,
}

impl Progress {
    /// Progress with zero counters and `done` unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes_written: 0,
            bytes_read: 0,
            done: false,
        }
    }

    /// Returns `true` when the step neither consumed nor produced bytes.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        self.bytes_written == 0 && self.bytes_read == 0
    }
}

impl AddAssign for Progress {
    fn add_assign(&mut self, rhs: Self) {
        self.bytes_written += rhs.bytes_written;
        self.bytes_read += rhs.bytes_read;
        self.done = self.done || rhs.done;
    }
}

impl Add for Progress {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// How much buffered state a compressor must push out on the current step.
///
/// Only [`NoFlush`](Self::NoFlush) and [`Finish`](Self::Finish) affect the
/// core algorithm; the remaining modes map onto whatever partial flush the
/// underlying engine offers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FlushMode {
    /// The codec may buffer input internally.
    #[default]
    NoFlush,
    /// Emit enough output for the receiver to make progress.
    Partial,
    /// Byte-align the output so everything consumed so far is decodable.
    Sync,
    /// Like `Sync`, but also reset any history window.
    Full,
    /// Emit the terminal block. Issuing `Finish` again after the codec
    /// reported `done` is a caller error.
    Finish,
    /// Stop at the next block boundary.
    Block,
}

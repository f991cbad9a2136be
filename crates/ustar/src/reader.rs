//! Streaming archive reader.

use std::io::{self, Read};

use oxtar_stream::InputBuf;

use crate::error::TarError;
use crate::header::{DecodedHeader, HeaderDecoder, BLOCK_SIZE};
use crate::member::UstarMember;

fn tar_to_io_error(error: TarError) -> io::Error {
    match error {
        TarError::Io(inner) => inner,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

/// Reads ustar members sequentially from any byte source.
///
/// The reader owns a cursor into its input: between [`next_member`] calls it
/// tracks how much of the current member's payload is unconsumed and how
/// many padding bytes follow it, and silently drains both before decoding
/// the next header.
///
/// [`next_member`]: Self::next_member
#[derive(Debug)]
pub struct UstarReader<R> {
    input: R,
    decoder: HeaderDecoder,
    remaining: u64,
    padding: u64,
}

impl<R: Read> UstarReader<R> {
    /// Creates a reader over `input`, positioned at the first header.
    #[must_use]
    pub fn new(input: R) -> Self {
        Self {
            input,
            decoder: HeaderDecoder::new(),
            remaining: 0,
            padding: 0,
        }
    }

    /// Consumes the reader and returns the underlying source.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Payload bytes of the current member not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Advances to the next member, draining whatever is left of the
    /// current one.
    ///
    /// Returns `None` at the archive terminator, or at a clean end of input
    /// between records.
    ///
    /// # Errors
    ///
    /// Returns header-codec errors for malformed records,
    /// [`TarError::TruncatedHeader`] when the input ends inside a record,
    /// and I/O errors from the source.
    pub fn next_member(&mut self) -> Result<Option<UstarMember>, TarError> {
        let leftover = self.remaining + self.padding;
        self.skip(leftover)?;
        self.remaining = 0;
        self.padding = 0;

        let mut chunk = [0u8; BLOCK_SIZE];
        loop {
            let wanted = self.decoder.bytes_needed();
            let got = self.input.read(&mut chunk[..wanted])?;
            if got == 0 {
                if self.decoder.is_mid_record() {
                    return Err(TarError::TruncatedHeader);
                }
                return Ok(None);
            }

            let mut input = InputBuf::new(&chunk[..got]);
            match self.decoder.decode(&mut input)? {
                None => {}
                Some(DecodedHeader::EndOfArchive) => return Ok(None),
                Some(DecodedHeader::Member(member)) => {
                    self.remaining = member.size;
                    self.padding = (BLOCK_SIZE as u64 - member.size % BLOCK_SIZE as u64)
                        % BLOCK_SIZE as u64;
                    return Ok(Some(*member));
                }
            }
        }
    }

    /// Reads up to `buf.len()` bytes of the current member's payload,
    /// returning how many were produced. Returns `0` once the member is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the source, including an unexpected end of
    /// input before the declared member size.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize, TarError> {
        let bound = usize::try_from(self.remaining.min(buf.len() as u64)).unwrap_or(usize::MAX);
        if bound == 0 {
            return Ok(0);
        }
        let got = self.input.read(&mut buf[..bound])?;
        if got == 0 {
            return Err(TarError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "archive ended inside a member's payload",
            )));
        }
        self.remaining -= got as u64;
        Ok(got)
    }

    /// Discards `n` bytes of the current member's payload.
    ///
    /// # Errors
    ///
    /// Returns [`TarError::ConsumeBeyondMember`] when `n` exceeds the
    /// member's unconsumed payload.
    pub fn consume(&mut self, n: u64) -> Result<(), TarError> {
        if n > self.remaining {
            return Err(TarError::ConsumeBeyondMember {
                requested: n,
                available: self.remaining,
            });
        }
        self.skip(n)?;
        self.remaining -= n;
        Ok(())
    }

    /// Returns a [`Read`] view over the rest of the current member's
    /// payload. Reading through the view debits the member cursor.
    pub fn data(&mut self) -> MemberData<'_, R> {
        MemberData { reader: self }
    }

    /// Collects the rest of the current member's payload into a vector.
    ///
    /// # Errors
    ///
    /// Propagates the same failures as [`read_data`](Self::read_data).
    pub fn all_data(&mut self) -> Result<Vec<u8>, TarError> {
        // Capacity is capped so a forged size field cannot force a huge
        // allocation before any data arrives.
        let mut collected =
            Vec::with_capacity(usize::try_from(self.remaining.min(64 * 1024)).unwrap_or(0));
        let mut chunk = [0u8; 4096];
        loop {
            let got = self.read_data(&mut chunk)?;
            if got == 0 {
                return Ok(collected);
            }
            collected.extend_from_slice(&chunk[..got]);
        }
    }

    /// Iterates over the remaining member headers.
    ///
    /// Payload access requires the reader itself, so the iterator yields
    /// metadata only; interleave [`next_member`](Self::next_member) and
    /// [`data`](Self::data) to read payloads.
    pub fn members(&mut self) -> Members<'_, R> {
        Members {
            reader: self,
            finished: false,
        }
    }

    fn skip(&mut self, mut n: u64) -> Result<(), TarError> {
        let mut scratch = [0u8; BLOCK_SIZE];
        while n > 0 {
            let want = usize::try_from(n.min(BLOCK_SIZE as u64)).unwrap_or(BLOCK_SIZE);
            let got = self.input.read(&mut scratch[..want])?;
            if got == 0 {
                return Err(TarError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "archive ended while skipping member data",
                )));
            }
            n -= got as u64;
        }
        Ok(())
    }
}

/// [`Read`] view over the current member's payload.
#[derive(Debug)]
pub struct MemberData<'a, R> {
    reader: &'a mut UstarReader<R>,
}

impl<R: Read> Read for MemberData<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read_data(buf).map_err(tar_to_io_error)
    }
}

/// Iterator over member headers.
#[derive(Debug)]
pub struct Members<'a, R> {
    reader: &'a mut UstarReader<R>,
    finished: bool,
}

impl<R: Read> Iterator for Members<'_, R> {
    type Item = Result<UstarMember, TarError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.next_member() {
            Ok(Some(member)) => Some(Ok(member)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

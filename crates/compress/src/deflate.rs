//! Adapters that drive the `flate2` DEFLATE engine through the resumable
//! codec contract.
//!
//! The adapters own no framing. Raw deflate streams (no zlib wrapper) are
//! produced and consumed so the gzip codec can supply its own header and
//! trailer around the body.

use flate2::{Compress, Decompress, FlushCompress, FlushDecompress, Status};

use oxtar_stream::{
    CodecError, Compressor, CorruptionKind, Decompressor, FlushMode, InputBuf, OutputBuf, Progress,
};

use crate::level::CompressionLevel;

fn flush_compress(mode: FlushMode) -> FlushCompress {
    match mode {
        FlushMode::NoFlush | FlushMode::Block => FlushCompress::None,
        FlushMode::Partial => FlushCompress::Partial,
        FlushMode::Sync => FlushCompress::Sync,
        FlushMode::Full => FlushCompress::Full,
        FlushMode::Finish => FlushCompress::Finish,
    }
}

/// Raw-DEFLATE compressor behind the [`Compressor`] contract.
///
/// `done` is reported exactly when the engine emits its terminal block,
/// which requires the caller to pass [`FlushMode::Finish`].
#[derive(Debug)]
pub struct DeflateCompressor {
    engine: Compress,
    finished: bool,
}

impl DeflateCompressor {
    /// Creates a compressor producing a raw deflate stream at `level`.
    #[must_use]
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            engine: Compress::new(level.into(), false),
            finished: false,
        }
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self::new(CompressionLevel::Default)
    }
}

impl Compressor for DeflateCompressor {
    fn compress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
        flush: FlushMode,
    ) -> Result<Progress, CodecError> {
        if self.finished {
            if !input.is_empty() {
                return Err(CodecError::InvalidState(
                    "deflate compressor fed input after its terminal block",
                ));
            }
            return Ok(Progress {
                bytes_written: 0,
                bytes_read: 0,
                done: true,
            });
        }

        let in_before = self.engine.total_in();
        let out_before = self.engine.total_out();
        let status = self
            .engine
            .compress(input.remaining(), out.unfilled(), flush_compress(flush))
            .map_err(|_| CodecError::Corrupted(CorruptionKind::Deflate))?;
        let bytes_read = (self.engine.total_in() - in_before) as usize;
        let bytes_written = (self.engine.total_out() - out_before) as usize;
        input.advance(bytes_read);
        out.advance(bytes_written);

        self.finished = status == Status::StreamEnd;
        Ok(Progress {
            bytes_written: bytes_written as u64,
            bytes_read: bytes_read as u64,
            done: self.finished,
        })
    }

    fn reset(&mut self) {
        self.engine.reset();
        self.finished = false;
    }
}

/// Raw-DEFLATE decompressor behind the [`Decompressor`] contract.
#[derive(Debug)]
pub struct InflateDecompressor {
    engine: Decompress,
    finished: bool,
}

impl InflateDecompressor {
    /// Creates a decompressor consuming a raw deflate stream.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: Decompress::new(false),
            finished: false,
        }
    }
}

impl Default for InflateDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for InflateDecompressor {
    fn decompress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
    ) -> Result<Progress, CodecError> {
        if self.finished {
            if !input.is_empty() {
                return Err(CodecError::InvalidState(
                    "inflate decompressor fed input after end of stream",
                ));
            }
            return Ok(Progress {
                bytes_written: 0,
                bytes_read: 0,
                done: true,
            });
        }

        let in_before = self.engine.total_in();
        let out_before = self.engine.total_out();
        let status = self
            .engine
            .decompress(input.remaining(), out.unfilled(), FlushDecompress::None)
            .map_err(|_| CodecError::Corrupted(CorruptionKind::Deflate))?;
        let bytes_read = (self.engine.total_in() - in_before) as usize;
        let bytes_written = (self.engine.total_out() - out_before) as usize;
        input.advance(bytes_read);
        out.advance(bytes_written);

        self.finished = status == Status::StreamEnd;
        Ok(Progress {
            bytes_written: bytes_written as u64,
            bytes_read: bytes_read as u64,
            done: self.finished,
        })
    }

    fn reset(&mut self) {
        self.engine.reset(false);
        self.finished = false;
    }
}

/// Compresses `input` as a raw deflate stream appended to `out`.
///
/// Passing a mode other than [`FlushMode::Finish`] leaves the stream open so
/// a later call on a codec instance can continue it; this helper always uses
/// a fresh codec, so anything but `Finish` produces a stream without its
/// terminal block.
///
/// # Errors
///
/// Propagates engine failures from the compressor.
pub fn compress_deflate(
    out: &mut Vec<u8>,
    input: &[u8],
    flush: FlushMode,
) -> Result<Progress, CodecError> {
    let mut codec = DeflateCompressor::new(CompressionLevel::Default);
    oxtar_stream::drive::compress_into(&mut codec, out, input, flush)
}

/// Decompresses a raw deflate stream from `input`, appending the payload to
/// `out`.
///
/// # Errors
///
/// Returns a corruption error when the engine rejects the stream.
pub fn decompress_inflate(out: &mut Vec<u8>, input: &[u8]) -> Result<Progress, CodecError> {
    let mut codec = InflateDecompressor::new();
    oxtar_stream::drive::decompress_into(&mut codec, out, input)
}

//! `Read`/`Write` adapters over the gzip codecs.
//!
//! These wrap the resumable state machines behind the standard I/O traits so
//! the archive layer can compose pipelines with `std::io::copy`. Both
//! adapters track how many bytes have crossed them so higher layers can
//! report sizes without buffering whole payloads.

use std::io::{self, Read, Write};

use oxtar_stream::{
    CodecError, Compressor, Decompressor, FlushMode, InputBuf, OutputBuf, Progress,
};

use crate::deflate::{DeflateCompressor, InflateDecompressor};
use crate::gzip::{GzipCompressor, GzipDecompressor};
use crate::level::CompressionLevel;

/// Scratch-buffer size shared by both adapters.
const SCRATCH_LEN: usize = 32 * 1024;

fn codec_error(error: CodecError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error)
}

/// Writer that gzip-compresses everything written through it into `inner`.
///
/// The stream must be completed with [`finish`](Self::finish); dropping the
/// writer without finishing leaves the gzip member truncated.
pub struct GzipWriter<W: Write> {
    inner: W,
    codec: GzipCompressor<DeflateCompressor>,
    scratch: Box<[u8]>,
    bytes_in: u64,
    bytes_out: u64,
}

impl<W: Write> GzipWriter<W> {
    /// Creates a writer producing a gzip member at `level` into `inner`.
    #[must_use]
    pub fn new(inner: W, level: CompressionLevel) -> Self {
        Self {
            inner,
            codec: GzipCompressor::new(DeflateCompressor::new(level)),
            scratch: vec![0; SCRATCH_LEN].into_boxed_slice(),
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    /// Number of payload bytes accepted so far.
    #[must_use]
    pub const fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Number of compressed bytes forwarded to the inner writer so far.
    #[must_use]
    pub const fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Provides immutable access to the underlying writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn pump(&mut self, input: &mut InputBuf<'_>, flush: FlushMode) -> io::Result<Progress> {
        let mut out = OutputBuf::new(&mut self.scratch);
        let progress = self
            .codec
            .compress(&mut out, input, flush)
            .map_err(codec_error)?;
        self.inner.write_all(out.filled())?;
        self.bytes_out += out.written() as u64;
        Ok(progress)
    }

    /// Emits the terminal block and trailer, returning the inner writer.
    ///
    /// # Errors
    ///
    /// Propagates codec failures and I/O errors from the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        let mut done = false;
        while !done {
            let mut input = InputBuf::new(&[]);
            done = self.pump(&mut input, FlushMode::Finish)?.done;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for GzipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut input = InputBuf::new(buf);
        while !input.is_empty() {
            self.pump(&mut input, FlushMode::NoFlush)?;
        }
        self.bytes_in += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Byte-align the deflate stream so everything written so far is
        // decodable, then flush the inner writer.
        loop {
            let mut input = InputBuf::new(&[]);
            let progress = self.pump(&mut input, FlushMode::Sync)?;
            if progress.bytes_written == 0 {
                break;
            }
        }
        self.inner.flush()
    }
}

/// Reader that decompresses a gzip member pulled from `inner`.
///
/// Bytes of `inner` past the end of the member are left unread.
pub struct GzipReader<R: Read> {
    inner: R,
    codec: GzipDecompressor<InflateDecompressor>,
    buffer: Box<[u8]>,
    start: usize,
    end: usize,
    bytes_out: u64,
    done: bool,
}

impl<R: Read> GzipReader<R> {
    /// Creates a reader decoding one gzip member from `inner`.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            codec: GzipDecompressor::new(InflateDecompressor::new()),
            buffer: vec![0; SCRATCH_LEN].into_boxed_slice(),
            start: 0,
            end: 0,
            bytes_out: 0,
            done: false,
        }
    }

    /// Number of decompressed bytes produced so far.
    #[must_use]
    pub const fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Returns `true` once the member's trailer has been verified.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.done
    }
}

impl<R: Read> Read for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }

        let mut out = OutputBuf::new(buf);
        loop {
            if self.start == self.end {
                self.start = 0;
                self.end = self.inner.read(&mut self.buffer)?;
            }
            let refilled = self.end - self.start;

            let mut input = InputBuf::new(&self.buffer[self.start..self.end]);
            let progress = self
                .codec
                .decompress(&mut out, &mut input)
                .map_err(codec_error)?;
            self.start += input.consumed();

            if progress.done {
                self.done = true;
                break;
            }
            if out.written() > 0 {
                break;
            }
            if refilled == 0 && progress.is_stalled() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "gzip stream ended before its trailer",
                ));
            }
        }

        self.bytes_out += out.written() as u64;
        Ok(out.written())
    }
}

#[cfg(test)]
mod tests {
    use super::{GzipReader, GzipWriter};
    use crate::gzip::{compress_gzip, decompress_gzip};
    use crate::level::CompressionLevel;
    use std::io::{Read, Write};

    #[test]
    fn writer_produces_a_stream_the_codec_accepts() {
        let payload: Vec<u8> = b"pipeline adapters ".repeat(100);
        let mut writer = GzipWriter::new(Vec::new(), CompressionLevel::Default);
        for chunk in payload.chunks(37) {
            writer.write_all(chunk).expect("write chunk");
        }
        assert_eq!(writer.bytes_in(), payload.len() as u64);
        let encoded = writer.finish().expect("finish stream");

        let mut decoded = Vec::new();
        decompress_gzip(&mut decoded, &encoded).expect("decompress");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn reader_decodes_a_codec_produced_stream() {
        let payload: Vec<u8> = b"round and round ".repeat(256);
        let mut encoded = Vec::new();
        compress_gzip(&mut encoded, &payload).expect("compress");

        let mut reader = GzipReader::new(&encoded[..]);
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).expect("read all");
        assert_eq!(decoded, payload);
        assert!(reader.is_finished());
        assert_eq!(reader.bytes_out(), payload.len() as u64);
    }

    #[test]
    fn truncated_stream_is_an_unexpected_eof() {
        let mut encoded = Vec::new();
        compress_gzip(&mut encoded, b"cut short").expect("compress");
        encoded.truncate(encoded.len() - 5);

        let mut reader = GzipReader::new(&encoded[..]);
        let mut decoded = Vec::new();
        let error = reader.read_to_end(&mut decoded).expect_err("must fail");
        assert_eq!(error.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn flush_keeps_the_stream_decodable_at_the_end() {
        let mut writer = GzipWriter::new(Vec::new(), CompressionLevel::Fast);
        writer.write_all(b"first half ").expect("write");
        writer.flush().expect("sync flush");
        writer.write_all(b"second half").expect("write");
        let encoded = writer.finish().expect("finish");

        let mut decoded = Vec::new();
        decompress_gzip(&mut decoded, &encoded).expect("decompress");
        assert_eq!(decoded, b"first half second half");
    }
}

//! Resumable gzip framing around an inner DEFLATE codec.
//!
//! Both directions are explicit state machines: every header and trailer
//! field is a distinct state carrying its own byte cursor, so a step can
//! suspend mid-field when the caller's buffer runs out and resume exactly
//! where it stopped on the next call. The inner DEFLATE step is itself a
//! sub-state that may span many driver calls.

use oxtar_checksums::Crc32;
use oxtar_stream::{
    drive, CodecError, Compressor, CorruptionKind, Decompressor, FlushMode, InputBuf, OutputBuf,
    Progress,
};

use crate::deflate::{DeflateCompressor, InflateDecompressor};
use crate::level::CompressionLevel;

/// Magic bytes followed by the DEFLATE method byte.
const MAGIC_AND_METHOD: [u8; 3] = [0x1F, 0x8B, 0x08];

const FTEXT: u8 = 1;
const FHCRC: u8 = 1 << 1;
const FEXTRA: u8 = 1 << 2;
const FNAME: u8 = 1 << 3;
const FCOMMENT: u8 = 1 << 4;

/// Largest extra field the decompressor captures.
const EXTRA_CAPACITY: usize = 2048;
/// Longest original-name capture; overflowing bytes are consumed and dropped.
const NAME_CAPACITY: usize = 1024;
/// Longest comment capture; overflowing bytes are consumed and dropped.
const COMMENT_CAPACITY: usize = 256;

/// Copies bytes from `input` into `dest` starting at `*pos`. Returns `true`
/// once `dest` is full.
fn fill_field(dest: &mut [u8], pos: &mut usize, input: &mut InputBuf<'_>) -> bool {
    let n = input.len().min(dest.len() - *pos);
    dest[*pos..*pos + n].copy_from_slice(&input.remaining()[..n]);
    input.advance(n);
    *pos += n;
    *pos == dest.len()
}

/// Reads bytes up to and including a NUL terminator, capturing at most
/// `capacity` of them. Returns `true` when the terminator was consumed.
fn read_zstr(input: &mut InputBuf<'_>, dest: &mut Vec<u8>, capacity: usize) -> bool {
    while let Some(byte) = input.take_byte() {
        if byte == 0 {
            return true;
        }
        if dest.len() < capacity {
            dest.push(byte);
        }
    }
    false
}

/// Emits bytes of a fixed field starting at `pos`. Returns the completed
/// state when done, or suspends in `resume` with the advanced cursor.
fn emit_field<S>(
    bytes: &[u8],
    pos: usize,
    out: &mut OutputBuf<'_>,
    resume: impl FnOnce(usize) -> S,
    next: S,
) -> Result<S, S> {
    let n = out.put_partial(&bytes[pos..]);
    if pos + n < bytes.len() {
        Err(resume(pos + n))
    } else {
        Ok(next)
    }
}

#[derive(Clone, Copy, Debug)]
enum EncodeState {
    Magic { pos: usize },
    Flags,
    Mtime { pos: usize },
    ExtraFlags,
    Os,
    Body,
    TrailerCrc { pos: usize },
    TrailerSize { pos: usize },
    Done,
}

/// Gzip compressor wrapping any inner [`Compressor`].
///
/// The emitted member uses the fixed default framing: no flag bytes set,
/// mtime zero for reproducible output, and OS `0xff` ("unknown"). The CRC-32
/// and size counters track the bytes *read from the caller's input*, not the
/// compressed bytes the inner codec emits.
///
/// The inner codec may be owned or borrowed: `GzipCompressor::new(inner)`
/// takes ownership, while `GzipCompressor::new(&mut inner)` borrows for the
/// wrapper's lifetime.
#[derive(Debug)]
pub struct GzipCompressor<C> {
    inner: C,
    state: EncodeState,
    crc: Crc32,
    size: u32,
}

/// Gzip compressor over the default DEFLATE engine.
pub type GzipDeflateCompressor = GzipCompressor<DeflateCompressor>;

impl<C> GzipCompressor<C> {
    /// Wraps `inner` in gzip framing.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            state: EncodeState::Magic { pos: 0 },
            crc: Crc32::new(),
            size: 0,
        }
    }

    /// Returns the inner codec.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Default> Default for GzipCompressor<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Compressor> Compressor for GzipCompressor<C> {
    fn compress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
        flush: FlushMode,
    ) -> Result<Progress, CodecError> {
        if matches!(self.state, EncodeState::Done) && !input.is_empty() {
            return Err(CodecError::InvalidState(
                "gzip compressor reused after completion without reset",
            ));
        }

        let out_start = out.written();
        let in_start = input.consumed();

        loop {
            match self.state {
                EncodeState::Magic { pos } => {
                    match emit_field(
                        &MAGIC_AND_METHOD,
                        pos,
                        out,
                        |pos| EncodeState::Magic { pos },
                        EncodeState::Flags,
                    ) {
                        Ok(next) => self.state = next,
                        Err(resume) => {
                            self.state = resume;
                            break;
                        }
                    }
                }
                EncodeState::Flags => {
                    if !out.put_byte(0) {
                        break;
                    }
                    self.state = EncodeState::Mtime { pos: 0 };
                }
                EncodeState::Mtime { pos } => {
                    match emit_field(
                        &[0, 0, 0, 0],
                        pos,
                        out,
                        |pos| EncodeState::Mtime { pos },
                        EncodeState::ExtraFlags,
                    ) {
                        Ok(next) => self.state = next,
                        Err(resume) => {
                            self.state = resume;
                            break;
                        }
                    }
                }
                EncodeState::ExtraFlags => {
                    if !out.put_byte(0) {
                        break;
                    }
                    self.state = EncodeState::Os;
                }
                EncodeState::Os => {
                    if !out.put_byte(0xFF) {
                        break;
                    }
                    self.state = EncodeState::Body;
                }
                EncodeState::Body => {
                    let fed_from = input.consumed();
                    let step = self.inner.compress(out, input, flush)?;
                    self.crc.update(&input.consumed_slice()[fed_from..]);
                    self.size = self.size.wrapping_add(step.bytes_read as u32);
                    if !step.done {
                        break;
                    }
                    self.state = EncodeState::TrailerCrc { pos: 0 };
                }
                EncodeState::TrailerCrc { pos } => {
                    match emit_field(
                        &self.crc.value().to_le_bytes(),
                        pos,
                        out,
                        |pos| EncodeState::TrailerCrc { pos },
                        EncodeState::TrailerSize { pos: 0 },
                    ) {
                        Ok(next) => self.state = next,
                        Err(resume) => {
                            self.state = resume;
                            break;
                        }
                    }
                }
                EncodeState::TrailerSize { pos } => {
                    match emit_field(
                        &self.size.to_le_bytes(),
                        pos,
                        out,
                        |pos| EncodeState::TrailerSize { pos },
                        EncodeState::Done,
                    ) {
                        Ok(next) => self.state = next,
                        Err(resume) => {
                            self.state = resume;
                            break;
                        }
                    }
                }
                EncodeState::Done => break,
            }
        }

        Ok(Progress {
            bytes_written: (out.written() - out_start) as u64,
            bytes_read: (input.consumed() - in_start) as u64,
            done: matches!(self.state, EncodeState::Done),
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.state = EncodeState::Magic { pos: 0 };
        self.crc.reset();
        self.size = 0;
    }
}

/// Metadata decoded from a gzip member header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GzipHeader {
    /// Modification time of the original file, Unix seconds, 0 if unset.
    pub mtime: u32,
    /// Extra flags byte (`XFL`).
    pub extra_flags: u8,
    /// Operating system byte; `0xff` means unknown.
    pub os: u8,
    /// The FTEXT hint was set.
    pub text: bool,
    /// FEXTRA payload, when present.
    pub extra: Option<Vec<u8>>,
    /// NUL-terminated original file name, when present (terminator removed).
    pub name: Option<Vec<u8>>,
    /// NUL-terminated comment, when present (terminator removed).
    pub comment: Option<Vec<u8>>,
}

#[derive(Clone, Copy, Debug)]
enum DecodeState {
    Magic { pos: usize },
    Method,
    Flags,
    Mtime { pos: usize },
    ExtraFlags,
    Os,
    ExtraLen { pos: usize },
    Extra { remaining: usize },
    Name,
    Comment,
    HeaderCrc { pos: usize },
    Body,
    StoredCrc { pos: usize },
    StoredSize { pos: usize },
    Done,
}

/// Gzip decompressor wrapping any inner [`Decompressor`].
///
/// The CRC-32 and size counters track the bytes *written to the caller's
/// output*; both are checked against the stream trailer once the inner codec
/// reports end of stream. Optional header fields are captured up to fixed
/// limits and exposed through [`header`](Self::header) once the header
/// states complete.
#[derive(Debug)]
pub struct GzipDecompressor<D> {
    inner: D,
    state: DecodeState,
    flags: u8,
    header: GzipHeader,
    scratch: [u8; 4],
    stored_crc: u32,
    actual_crc: Crc32,
    actual_size: u64,
}

/// Gzip decompressor over the default INFLATE engine.
pub type GzipInflateDecompressor = GzipDecompressor<InflateDecompressor>;

impl<D> GzipDecompressor<D> {
    /// Wraps `inner` in gzip deframing.
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            state: DecodeState::Magic { pos: 0 },
            flags: 0,
            header: GzipHeader::default(),
            scratch: [0; 4],
            stored_crc: 0,
            actual_crc: Crc32::new(),
            actual_size: 0,
        }
    }

    /// Returns the inner codec.
    #[must_use]
    pub fn into_inner(self) -> D {
        self.inner
    }

    /// Returns the decoded member header once every header state has
    /// completed, `None` while the header is still being read.
    #[must_use]
    pub fn header(&self) -> Option<&GzipHeader> {
        match self.state {
            DecodeState::Body
            | DecodeState::StoredCrc { .. }
            | DecodeState::StoredSize { .. }
            | DecodeState::Done => Some(&self.header),
            _ => None,
        }
    }

    fn after_extra(&self) -> DecodeState {
        if self.flags & FNAME != 0 {
            DecodeState::Name
        } else {
            self.after_name()
        }
    }

    fn after_name(&self) -> DecodeState {
        if self.flags & FCOMMENT != 0 {
            DecodeState::Comment
        } else {
            self.after_comment()
        }
    }

    fn after_comment(&self) -> DecodeState {
        if self.flags & FHCRC != 0 {
            DecodeState::HeaderCrc { pos: 0 }
        } else {
            DecodeState::Body
        }
    }
}

impl<D: Default> Default for GzipDecompressor<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: Decompressor> Decompressor for GzipDecompressor<D> {
    fn decompress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
    ) -> Result<Progress, CodecError> {
        if matches!(self.state, DecodeState::Done) && !input.is_empty() {
            return Err(CodecError::InvalidState(
                "gzip decompressor reused after completion without reset",
            ));
        }

        let out_start = out.written();
        let in_start = input.consumed();

        loop {
            match self.state {
                DecodeState::Magic { mut pos } => {
                    if !fill_field(&mut self.scratch[..2], &mut pos, input) {
                        self.state = DecodeState::Magic { pos };
                        break;
                    }
                    if self.scratch[..2] != [0x1F, 0x8B] {
                        return Err(CodecError::InvalidFormat(
                            "invalid gzip magic number".into(),
                        ));
                    }
                    self.state = DecodeState::Method;
                }
                DecodeState::Method => {
                    let Some(method) = input.take_byte() else {
                        break;
                    };
                    if method != 0x08 {
                        return Err(CodecError::InvalidFormat(format!(
                            "unsupported gzip compression method {method:#04x}"
                        )));
                    }
                    self.state = DecodeState::Flags;
                }
                DecodeState::Flags => {
                    let Some(flags) = input.take_byte() else {
                        break;
                    };
                    self.flags = flags;
                    self.header.text = flags & FTEXT != 0;
                    self.state = DecodeState::Mtime { pos: 0 };
                }
                DecodeState::Mtime { mut pos } => {
                    if !fill_field(&mut self.scratch, &mut pos, input) {
                        self.state = DecodeState::Mtime { pos };
                        break;
                    }
                    self.header.mtime = u32::from_le_bytes(self.scratch);
                    self.state = DecodeState::ExtraFlags;
                }
                DecodeState::ExtraFlags => {
                    let Some(xfl) = input.take_byte() else {
                        break;
                    };
                    self.header.extra_flags = xfl;
                    self.state = DecodeState::Os;
                }
                DecodeState::Os => {
                    let Some(os) = input.take_byte() else {
                        break;
                    };
                    self.header.os = os;
                    self.state = if self.flags & FEXTRA != 0 {
                        DecodeState::ExtraLen { pos: 0 }
                    } else {
                        self.after_extra()
                    };
                }
                DecodeState::ExtraLen { mut pos } => {
                    if !fill_field(&mut self.scratch[..2], &mut pos, input) {
                        self.state = DecodeState::ExtraLen { pos };
                        break;
                    }
                    let declared = u16::from_le_bytes([self.scratch[0], self.scratch[1]]) as usize;
                    if declared > EXTRA_CAPACITY {
                        return Err(CodecError::CapacityExceeded {
                            field: "gzip extra field",
                            limit: EXTRA_CAPACITY,
                            requested: declared,
                        });
                    }
                    self.header.extra = Some(Vec::with_capacity(declared));
                    self.state = DecodeState::Extra {
                        remaining: declared,
                    };
                }
                DecodeState::Extra { remaining } => {
                    let extra = self
                        .header
                        .extra
                        .as_mut()
                        .ok_or(CodecError::InvalidState("extra capture missing"))?;
                    let n = input.len().min(remaining);
                    extra.extend_from_slice(&input.remaining()[..n]);
                    input.advance(n);
                    if n < remaining {
                        self.state = DecodeState::Extra {
                            remaining: remaining - n,
                        };
                        break;
                    }
                    self.state = self.after_extra();
                }
                DecodeState::Name => {
                    let name = self.header.name.get_or_insert_with(Vec::new);
                    if !read_zstr(input, name, NAME_CAPACITY) {
                        break;
                    }
                    self.state = self.after_name();
                }
                DecodeState::Comment => {
                    let comment = self.header.comment.get_or_insert_with(Vec::new);
                    if !read_zstr(input, comment, COMMENT_CAPACITY) {
                        break;
                    }
                    self.state = self.after_comment();
                }
                DecodeState::HeaderCrc { mut pos } => {
                    // Captured but not validated, like most gzip readers.
                    if !fill_field(&mut self.scratch[..2], &mut pos, input) {
                        self.state = DecodeState::HeaderCrc { pos };
                        break;
                    }
                    self.state = DecodeState::Body;
                }
                DecodeState::Body => {
                    let out_from = out.written();
                    let step = self.inner.decompress(out, input)?;
                    self.actual_crc.update(&out.filled()[out_from..]);
                    self.actual_size += step.bytes_written;
                    if !step.done {
                        break;
                    }
                    self.state = DecodeState::StoredCrc { pos: 0 };
                }
                DecodeState::StoredCrc { mut pos } => {
                    if !fill_field(&mut self.scratch, &mut pos, input) {
                        self.state = DecodeState::StoredCrc { pos };
                        break;
                    }
                    self.stored_crc = u32::from_le_bytes(self.scratch);
                    self.state = DecodeState::StoredSize { pos: 0 };
                }
                DecodeState::StoredSize { mut pos } => {
                    if !fill_field(&mut self.scratch, &mut pos, input) {
                        self.state = DecodeState::StoredSize { pos };
                        break;
                    }
                    let stored_size = u32::from_le_bytes(self.scratch);
                    if self.actual_crc.value() != self.stored_crc {
                        return Err(CodecError::Corrupted(CorruptionKind::CrcMismatch));
                    }
                    if self.actual_size as u32 != stored_size {
                        return Err(CodecError::Corrupted(CorruptionKind::LengthMismatch));
                    }
                    self.state = DecodeState::Done;
                }
                DecodeState::Done => break,
            }
        }

        Ok(Progress {
            bytes_written: (out.written() - out_start) as u64,
            bytes_read: (input.consumed() - in_start) as u64,
            done: matches!(self.state, DecodeState::Done),
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.state = DecodeState::Magic { pos: 0 };
        self.flags = 0;
        self.header = GzipHeader::default();
        self.stored_crc = 0;
        self.actual_crc.reset();
        self.actual_size = 0;
    }
}

/// Compresses `input` as a complete gzip member appended to `out`.
///
/// # Errors
///
/// Propagates codec failures from the framing or the DEFLATE engine.
pub fn compress_gzip(out: &mut Vec<u8>, input: &[u8]) -> Result<Progress, CodecError> {
    let mut codec = GzipCompressor::new(DeflateCompressor::new(CompressionLevel::Default));
    drive::compress_into(&mut codec, out, input, FlushMode::Finish)
}

/// Decompresses a complete gzip member from `input`, appending the payload
/// to `out`.
///
/// # Errors
///
/// Propagates format, capacity, and integrity failures from the framing and
/// corruption errors from the DEFLATE engine.
pub fn decompress_gzip(out: &mut Vec<u8>, input: &[u8]) -> Result<Progress, CodecError> {
    let mut codec = GzipDecompressor::new(InflateDecompressor::new());
    drive::decompress_into(&mut codec, out, input)
}

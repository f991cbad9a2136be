//! The resumable step traits implemented by every codec in the workspace.

use crate::{CodecError, FlushMode, InputBuf, OutputBuf, Progress};

/// A stateful transformer that turns plain bytes into encoded bytes.
///
/// A step consumes any prefix of `input` and writes any prefix of `out`. It
/// must advance at least one of the two cursors on every call unless both
/// buffers are empty or the codec has finished. After the step that reports
/// `done`, further calls with non-empty input fail with
/// [`CodecError::InvalidState`] until [`reset`](Self::reset) is called.
pub trait Compressor {
    /// Runs one step of the transformation.
    fn compress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
        flush: FlushMode,
    ) -> Result<Progress, CodecError>;

    /// Restores the initial state unconditionally.
    fn reset(&mut self);
}

/// A stateful transformer that turns encoded bytes back into plain bytes.
///
/// The decode direction carries no flush parameter: the encoded stream itself
/// says where it ends.
pub trait Decompressor {
    /// Runs one step of the transformation.
    fn decompress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
    ) -> Result<Progress, CodecError>;

    /// Restores the initial state unconditionally.
    fn reset(&mut self);
}

impl<T: Compressor + ?Sized> Compressor for &mut T {
    fn compress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
        flush: FlushMode,
    ) -> Result<Progress, CodecError> {
        (**self).compress(out, input, flush)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

impl<T: Decompressor + ?Sized> Decompressor for &mut T {
    fn decompress(
        &mut self,
        out: &mut OutputBuf<'_>,
        input: &mut InputBuf<'_>,
    ) -> Result<Progress, CodecError> {
        (**self).decompress(out, input)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

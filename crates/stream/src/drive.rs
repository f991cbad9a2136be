//! Driver loops that repeatedly step a codec over bounded destinations.
//!
//! Two destination shapes are supported: a dynamically grown `Vec<u8>` and a
//! chain of fixed output segments. Both carry partially-filled destinations
//! forward between steps and compute the total progress by summation.

use crate::{CodecError, Compressor, Decompressor, FlushMode, InputBuf, OutputBuf, Progress};

/// Granularity by which the vector drivers grow their destination.
const GROWTH_CHUNK: usize = 32 * 1024;

/// Compresses all of `input` into `out`, growing `out` as needed.
///
/// With [`FlushMode::Finish`] the loop runs until the codec reports `done`;
/// with any other mode it stops once the input is exhausted, leaving
/// whatever the codec buffered internally for a later flush.
///
/// # Errors
///
/// Propagates codec errors; a step that makes no progress although it has
/// fresh output room yields [`CodecError::Stalled`].
pub fn compress_into<C: Compressor>(
    codec: &mut C,
    out: &mut Vec<u8>,
    input: &[u8],
    flush: FlushMode,
) -> Result<Progress, CodecError> {
    let mut total = Progress::new();
    let mut input = InputBuf::new(input);

    loop {
        let start = out.len();
        out.resize(start + GROWTH_CHUNK, 0);
        let mut dest = OutputBuf::new(&mut out[start..]);
        let step = codec.compress(&mut dest, &mut input, flush);
        let written = dest.written();
        out.truncate(start + written);
        let step = step?;
        total += step;

        if total.done {
            break;
        }
        if flush == FlushMode::Finish {
            if step.is_stalled() {
                return Err(CodecError::Stalled);
            }
            continue;
        }
        if input.is_empty() {
            break;
        }
        if step.is_stalled() {
            return Err(CodecError::Stalled);
        }
    }

    Ok(total)
}

/// Decompresses from `input` into `out`, growing `out` as needed.
///
/// Stops when the codec reports `done` or when the input is exhausted
/// without the codec producing further output (more input is required).
///
/// # Errors
///
/// Propagates codec errors; a zero-progress step with input still pending
/// yields [`CodecError::Stalled`].
pub fn decompress_into<D: Decompressor>(
    codec: &mut D,
    out: &mut Vec<u8>,
    input: &[u8],
) -> Result<Progress, CodecError> {
    let mut total = Progress::new();
    let mut input = InputBuf::new(input);

    loop {
        let start = out.len();
        out.resize(start + GROWTH_CHUNK, 0);
        let mut dest = OutputBuf::new(&mut out[start..]);
        let step = codec.decompress(&mut dest, &mut input);
        let written = dest.written();
        out.truncate(start + written);
        let step = step?;
        total += step;

        if total.done {
            break;
        }
        if input.is_empty() && step.bytes_written == 0 {
            break;
        }
        if step.is_stalled() {
            return Err(CodecError::Stalled);
        }
    }

    Ok(total)
}

/// Compresses `input` across a chain of fixed output segments.
///
/// Partially-filled segments are carried forward: the loop moves to the next
/// segment only once the current one is full. Returns the summed progress;
/// the filled prefix of each segment is `bytes_written` laid out in order.
///
/// # Errors
///
/// Propagates codec errors and reports [`CodecError::Stalled`] on a
/// zero-progress step with room remaining.
pub fn compress_segments<C: Compressor>(
    codec: &mut C,
    outputs: &mut [&mut [u8]],
    input: &[u8],
    flush: FlushMode,
) -> Result<Progress, CodecError> {
    let mut total = Progress::new();
    let mut input = InputBuf::new(input);

    for segment in outputs.iter_mut() {
        let mut dest = OutputBuf::new(segment);
        while !dest.is_empty() {
            let step = codec.compress(&mut dest, &mut input, flush)?;
            total += step;
            if total.done {
                return Ok(total);
            }
            if flush != FlushMode::Finish && input.is_empty() {
                return Ok(total);
            }
            if step.is_stalled() {
                if dest.is_empty() {
                    break;
                }
                return Err(CodecError::Stalled);
            }
        }
    }

    Ok(total)
}

/// Decompresses `input` across a chain of fixed output segments.
///
/// # Errors
///
/// Propagates codec errors and reports [`CodecError::Stalled`] on a
/// zero-progress step with both buffers non-empty.
pub fn decompress_segments<D: Decompressor>(
    codec: &mut D,
    outputs: &mut [&mut [u8]],
    input: &[u8],
) -> Result<Progress, CodecError> {
    let mut total = Progress::new();
    let mut input = InputBuf::new(input);

    for segment in outputs.iter_mut() {
        let mut dest = OutputBuf::new(segment);
        while !dest.is_empty() {
            let step = codec.decompress(&mut dest, &mut input)?;
            total += step;
            if total.done {
                return Ok(total);
            }
            if input.is_empty() && step.bytes_written == 0 {
                return Ok(total);
            }
            if step.is_stalled() {
                return Err(CodecError::Stalled);
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Codec that copies input through and finishes on `Finish`, emitting a
    /// single `!` terminal byte.
    struct Passthrough {
        terminal_emitted: bool,
        finished: bool,
    }

    impl Passthrough {
        fn new() -> Self {
            Self {
                terminal_emitted: false,
                finished: false,
            }
        }
    }

    impl Compressor for Passthrough {
        fn compress(
            &mut self,
            out: &mut OutputBuf<'_>,
            input: &mut InputBuf<'_>,
            flush: FlushMode,
        ) -> Result<Progress, CodecError> {
            if self.finished && !input.is_empty() {
                return Err(CodecError::InvalidState(
                    "compressor fed input after completion",
                ));
            }
            let copied = input.copy_to(out) as u64;
            let mut written = copied;
            if flush == FlushMode::Finish && input.is_empty() && !self.terminal_emitted {
                if out.put_byte(b'!') {
                    self.terminal_emitted = true;
                    self.finished = true;
                    written += 1;
                }
            }
            Ok(Progress {
                bytes_written: written,
                bytes_read: copied,
                done: self.finished,
            })
        }

        fn reset(&mut self) {
            self.terminal_emitted = false;
            self.finished = false;
        }
    }

    #[test]
    fn vector_driver_runs_to_completion() {
        let mut codec = Passthrough::new();
        let mut out = Vec::new();
        let progress =
            compress_into(&mut codec, &mut out, b"hello", FlushMode::Finish).expect("drive");
        assert!(progress.done);
        assert_eq!(progress.bytes_read, 5);
        assert_eq!(progress.bytes_written, 6);
        assert_eq!(out, b"hello!");
    }

    #[test]
    fn vector_driver_without_finish_stops_at_input_end() {
        let mut codec = Passthrough::new();
        let mut out = Vec::new();
        let progress =
            compress_into(&mut codec, &mut out, b"hello", FlushMode::NoFlush).expect("drive");
        assert!(!progress.done);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn segment_driver_carries_partial_segments_forward() {
        let mut codec = Passthrough::new();
        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        let progress = {
            let mut segments: [&mut [u8]; 2] = [&mut a, &mut b];
            compress_segments(&mut codec, &mut segments, b"hello", FlushMode::Finish)
                .expect("drive")
        };
        assert!(progress.done);
        assert_eq!(progress.bytes_written, 6);
        assert_eq!(&a, b"hell");
        assert_eq!(&b[..2], b"o!");
    }

    #[test]
    fn segment_driver_reports_exhausted_output() {
        let mut codec = Passthrough::new();
        let mut only = [0u8; 3];
        let progress = {
            let mut segments: [&mut [u8]; 1] = [&mut only];
            compress_segments(&mut codec, &mut segments, b"hello", FlushMode::Finish)
                .expect("drive")
        };
        assert!(!progress.done);
        assert_eq!(progress.bytes_written, 3);
        assert_eq!(progress.bytes_read, 3);
    }

    /// Codec that copies bytes through until a NUL terminator.
    struct UnframeNul {
        finished: bool,
    }

    impl Decompressor for UnframeNul {
        fn decompress(
            &mut self,
            out: &mut OutputBuf<'_>,
            input: &mut InputBuf<'_>,
        ) -> Result<Progress, CodecError> {
            let mut progress = Progress::new();
            while !self.finished && !out.is_empty() {
                let Some(byte) = input.take_byte() else {
                    break;
                };
                progress.bytes_read += 1;
                if byte == 0 {
                    self.finished = true;
                    break;
                }
                out.put_byte(byte);
                progress.bytes_written += 1;
            }
            progress.done = self.finished;
            Ok(progress)
        }

        fn reset(&mut self) {
            self.finished = false;
        }
    }

    #[test]
    fn decompress_segment_driver_stops_at_the_terminal_marker() {
        let mut codec = UnframeNul { finished: false };
        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        let progress = {
            let mut segments: [&mut [u8]; 2] = [&mut a, &mut b];
            decompress_segments(&mut codec, &mut segments, b"data\x00junk").expect("drive")
        };
        assert!(progress.done);
        assert_eq!(progress.bytes_written, 4);
        assert_eq!(progress.bytes_read, 5, "the terminator is consumed, trailing bytes are not");
        assert_eq!(&a, b"dat");
        assert_eq!(&b[..1], b"a");
    }

    #[test]
    fn decompress_vector_driver_reports_remaining_input_need() {
        let mut codec = UnframeNul { finished: false };
        let mut out = Vec::new();
        let progress = decompress_into(&mut codec, &mut out, b"unterminated").expect("drive");
        assert!(!progress.done);
        assert_eq!(out, b"unterminated");
    }

    /// Codec that never makes progress, to exercise the stall guard.
    struct Broken;

    impl Compressor for Broken {
        fn compress(
            &mut self,
            _out: &mut OutputBuf<'_>,
            _input: &mut InputBuf<'_>,
            _flush: FlushMode,
        ) -> Result<Progress, CodecError> {
            Ok(Progress::new())
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn stalled_codec_is_an_error_not_a_hang() {
        let mut out = Vec::new();
        let result = compress_into(&mut Broken, &mut out, b"data", FlushMode::Finish);
        assert_eq!(result, Err(CodecError::Stalled));
    }
}

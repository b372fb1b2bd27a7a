use syslog_wire::{BytePredicate, Scanner};

use crate::char_buffer::CharBuffer;
use crate::engine::{CoderResult, DecodeEngine, ErrorAction, Utf8Engine};
use crate::error::DecodeError;

/// Capacity of the scratch buffer that carries a partial sequence from one
/// chunk to the next.
pub const SCRATCH_CAPACITY: usize = 10;

const REPLACEMENT: char = '\u{FFFD}';

/// Result of a scanner-driven decode loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Characters appended to the destination by this call.
    pub chars: usize,
    /// Why the loop stopped. `Underflow` means the delimiter was reached
    /// and the scanner cursor sits on it.
    pub stop: CoderResult,
}

/// Decodes a byte stream that arrives in arbitrary chunks.
///
/// A multi-byte sequence cut by a chunk boundary is parked in a small
/// scratch buffer and completed from the next input, so the character is
/// decoded as one unit. No byte is dropped or decoded twice across calls.
///
/// ```text
///   chunk 1: ... 61 E2 82 │          chunk 2: AC 62 ...
///                 └──┬──┘ │                   │
///              scratch: [E2 82] ◀── completed ┘  → "a€b"
/// ```
///
/// Malformed and unmappable input is handled by the configured
/// [`ErrorAction`]s, both `Fail` by default.
///
/// The counters ([`bytes_decoded`](Self::bytes_decoded),
/// [`chars_decoded`](Self::chars_decoded)) grow only when the engine really
/// runs, which makes skipped decoding observable.
#[derive(Debug)]
pub struct IncrementalDecoder<E = Utf8Engine> {
    engine: E,
    pending: [u8; SCRATCH_CAPACITY],
    pending_len: usize,
    on_malformed: ErrorAction,
    on_unmappable: ErrorAction,
    bytes_decoded: u64,
    chars_decoded: u64,
}

impl Default for IncrementalDecoder<Utf8Engine> {
    fn default() -> Self {
        Self::new(Utf8Engine)
    }
}

impl<E: DecodeEngine> IncrementalDecoder<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            pending: [0; SCRATCH_CAPACITY],
            pending_len: 0,
            on_malformed: ErrorAction::Fail,
            on_unmappable: ErrorAction::Fail,
            bytes_decoded: 0,
            chars_decoded: 0,
        }
    }

    #[must_use]
    pub fn with_on_malformed(mut self, action: ErrorAction) -> Self {
        self.on_malformed = action;
        self
    }

    #[must_use]
    pub fn with_on_unmappable(mut self, action: ErrorAction) -> Self {
        self.on_unmappable = action;
        self
    }

    pub fn set_on_malformed(&mut self, action: ErrorAction) {
        self.on_malformed = action;
    }

    pub fn set_on_unmappable(&mut self, action: ErrorAction) {
        self.on_unmappable = action;
    }

    /// Bytes run through the engine so far.
    #[must_use]
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded
    }

    /// Characters produced so far, replacements included.
    #[must_use]
    pub fn chars_decoded(&self) -> u64 {
        self.chars_decoded
    }

    /// Bytes of a partial sequence waiting for more input.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending[..self.pending_len]
    }

    pub fn discard_pending(&mut self) {
        self.pending_len = 0;
    }

    /// Clear pending bytes, counters and engine state.
    pub fn reset(&mut self) {
        self.pending_len = 0;
        self.bytes_decoded = 0;
        self.chars_decoded = 0;
        self.engine.reset();
    }

    // ── Slice decoding ─────────────────────────────────────────────────

    /// Decode `src` into `dst`, returning the result and how many bytes of
    /// `src` were consumed.
    ///
    /// A trailing partial sequence is consumed into the scratch buffer and
    /// completed by the next call. With `end_of_input` set, a partial
    /// sequence is malformed instead.
    ///
    /// # Errors
    ///
    /// [`DecodeError::ScratchOverflow`] if a partial sequence does not fit
    /// in the scratch buffer.
    pub fn decode(
        &mut self,
        src: &[u8],
        dst: &mut CharBuffer,
        end_of_input: bool,
    ) -> Result<(CoderResult, usize), DecodeError> {
        let mut consumed = 0;

        if self.pending_len > 0 {
            let held = self.pending_len;
            let take = (SCRATCH_CAPACITY - held).min(src.len());
            let mut merged = [0u8; SCRATCH_CAPACITY];
            merged[..held].copy_from_slice(&self.pending[..held]);
            merged[held..held + take].copy_from_slice(&src[..take]);
            let len = held + take;

            let (result, used) = self.run(&merged[..len], dst, end_of_input && take == src.len());
            if used >= held {
                // The parked sequence is resolved; whatever is left of
                // `merged` still sits in `src` and is decoded below.
                self.pending_len = 0;
                consumed = used - held;
                if result != CoderResult::Underflow {
                    return Ok((result, consumed));
                }
            } else if result == CoderResult::Underflow {
                if take < src.len() {
                    return Err(DecodeError::ScratchOverflow {
                        pending: len - used,
                        capacity: SCRATCH_CAPACITY,
                    });
                }
                self.park(&merged[used..len]);
                return Ok((CoderResult::Underflow, take));
            } else {
                self.park(&merged[used..held]);
                return Ok((result, 0));
            }
        }

        let (result, used) = self.run(&src[consumed..], dst, end_of_input);
        consumed += used;
        if result == CoderResult::Underflow && consumed < src.len() {
            let tail = &src[consumed..];
            if tail.len() > SCRATCH_CAPACITY {
                return Err(DecodeError::ScratchOverflow {
                    pending: tail.len(),
                    capacity: SCRATCH_CAPACITY,
                });
            }
            self.park(tail);
            consumed = src.len();
        }
        Ok((result, consumed))
    }

    /// Decode any parked bytes as end of input.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn flush(&mut self, dst: &mut CharBuffer) -> Result<CoderResult, DecodeError> {
        self.decode(&[], dst, true).map(|(result, _)| result)
    }

    /// Decode a token that is known to be complete.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_complete(
        &mut self,
        src: &[u8],
        dst: &mut CharBuffer,
    ) -> Result<CoderResult, DecodeError> {
        self.decode(src, dst, true).map(|(result, _)| result)
    }

    // ── Scanner-driven decoding ────────────────────────────────────────

    /// Decode up to `max` bytes of the scanner's current window without
    /// suspending. Returns the result and the bytes consumed.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_available(
        &mut self,
        src: &mut Scanner,
        dst: &mut CharBuffer,
        max: usize,
    ) -> Result<(CoderResult, usize), DecodeError> {
        let window = src.peek_available(max);
        let (result, used) = self.decode(&window, dst, false)?;
        src.skip_available(used);
        Ok((result, used))
    }

    /// Like [`decode_available`](Self::decode_available), but stops in
    /// front of the first byte matching `pred`. A delimiter inside the
    /// window ends the input, so a partial sequence right before it is
    /// malformed.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_available_until<P: BytePredicate>(
        &mut self,
        src: &mut Scanner,
        dst: &mut CharBuffer,
        pred: &P,
        max: usize,
    ) -> Result<(CoderResult, usize), DecodeError> {
        let (window, found) = src.available_until(pred, max);
        let (result, used) = self.decode(&window, dst, found)?;
        src.skip_available(used);
        Ok((result, used))
    }

    /// Decode from the scanner until a byte matching `pred` is next, the
    /// destination fills, bad input stops the decode, or the stream ends.
    ///
    /// The delimiter itself is not consumed.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub async fn decode_until<P: BytePredicate>(
        &mut self,
        src: &mut Scanner,
        dst: &mut CharBuffer,
        pred: &P,
    ) -> Result<Decoded, DecodeError> {
        let start = dst.len();
        loop {
            if !src.receive().await {
                let stop = match self.flush(dst)? {
                    CoderResult::Underflow => CoderResult::Eof,
                    other => other,
                };
                return Ok(Decoded {
                    chars: dst.len() - start,
                    stop,
                });
            }
            let (window, found) = src.available_until(pred, usize::MAX);
            let (result, used) = self.decode(&window, dst, found)?;
            src.skip_available(used);
            match result {
                CoderResult::Underflow if !found => {}
                stop => {
                    return Ok(Decoded {
                        chars: dst.len() - start,
                        stop,
                    });
                }
            }
        }
    }

    /// Decode the rest of the stream. Stops with `Eof` at the end, or
    /// earlier on overflow or bad input.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub async fn decode_until_end(
        &mut self,
        src: &mut Scanner,
        dst: &mut CharBuffer,
    ) -> Result<Decoded, DecodeError> {
        self.decode_until(src, dst, &|_: u8| false).await
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn park(&mut self, bytes: &[u8]) {
        self.pending[..bytes.len()].copy_from_slice(bytes);
        self.pending_len = bytes.len();
    }

    /// Drive the engine over `src`, applying the error policy.
    fn run(&mut self, src: &[u8], dst: &mut CharBuffer, end_of_input: bool) -> (CoderResult, usize) {
        let mut pos = 0;
        let outcome = loop {
            let before = dst.len();
            let (result, used) = self.engine.decode(&src[pos..], dst, end_of_input);
            pos += used;
            self.chars_decoded += (dst.len() - before) as u64;

            let (len, action) = match result {
                CoderResult::Malformed(len) => (len, self.on_malformed),
                CoderResult::Unmappable(len) => (len, self.on_unmappable),
                other => break other,
            };
            tracing::trace!(?result, %action, "bad input");
            match action {
                ErrorAction::Fail => break result,
                ErrorAction::Replace => {
                    if !dst.push(REPLACEMENT) {
                        break CoderResult::Overflow;
                    }
                    self.chars_decoded += 1;
                }
                ErrorAction::Ignore => {}
            }
            pos += len;
        };
        self.bytes_decoded += pos as u64;
        (outcome, pos)
    }
}

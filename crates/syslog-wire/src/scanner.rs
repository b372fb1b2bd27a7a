use bytes::Bytes;

use crate::byte_class::BytePredicate;
use crate::channel::{ChunkReceiver, ChunkSender, rendezvous};
use crate::sink::ByteSink;

/// Why [`Scanner::read_until`] or [`Scanner::read_to_end`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// The delimiter was reached. The cursor sits on it.
    Found,
    /// The stream closed first. Everything up to the end was copied.
    Eof,
    /// The sink stopped accepting bytes. The cursor sits on the first
    /// byte that did not fit.
    SinkFull,
}

/// Receives decimal digit values (`0..=9`) from [`Scanner::read_digits`].
///
/// Integers accumulate with wrapping arithmetic; a value that does not fit
/// wraps around rather than failing. Closures work too:
///
/// ```
/// # use syslog_wire::scanner::Accumulator;
/// let mut seen = Vec::new();
/// let mut acc = |d: u8| seen.push(d);
/// acc.push_digit(4);
/// acc.push_digit(2);
/// assert_eq!(seen, [4, 2]);
/// ```
pub trait Accumulator {
    fn push_digit(&mut self, digit: u8);
}

impl<F: FnMut(u8)> Accumulator for F {
    fn push_digit(&mut self, digit: u8) {
        self(digit);
    }
}

macro_rules! integer_accumulator {
    ($($ty:ty),*) => {
        $(
            impl Accumulator for $ty {
                #[inline]
                fn push_digit(&mut self, digit: u8) {
                    *self = self.wrapping_mul(10).wrapping_add(<$ty>::from(digit));
                }
            }
        )*
    };
}

integer_accumulator!(u16, u32, u64, i32, i64);

/// A cursor over a stream of chunks arriving through a [`rendezvous`]
/// channel.
///
/// Every async method suspends transparently when the current chunk runs
/// out and pulls the next one. Running out of input is never an error:
/// the methods report "not found" / `None` / a short count instead.
///
/// ```text
///   chunk k                          chunk k+1
///   ┌───────────────┬──────────┐     ┌────────────────────┐
///   │   consumed    │ window   │ ──▶ │                    │
///   └───────────────┴──────────┘     └────────────────────┘
///                   ▲ pos             fetched once the window is empty
/// ```
///
/// Methods whose name contains `available` only look at the current
/// window and never suspend. The slices they hand out are zero-copy
/// [`Bytes`] views of the chunk.
pub struct Scanner {
    rx: ChunkReceiver,
    input: Bytes,
    pos: usize,
    received: u64,
    closed: bool,
}

impl Scanner {
    pub fn new(rx: ChunkReceiver) -> Self {
        Self {
            rx,
            input: Bytes::new(),
            pos: 0,
            received: 0,
            closed: false,
        }
    }

    /// A scanner plus the sender feeding it.
    #[must_use]
    pub fn channel() -> (ChunkSender, Scanner) {
        let (tx, rx) = rendezvous();
        (tx, Scanner::new(rx))
    }

    /// Whether the producer closed the stream. Bytes may still be
    /// available in the last window.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total bytes consumed from the stream so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.received - self.available() as u64
    }

    /// Bytes left in the current window.
    #[must_use]
    pub fn available(&self) -> usize {
        self.input.len() - self.pos
    }

    #[must_use]
    pub fn has_available(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Make at least one byte available, pulling chunks as needed.
    ///
    /// Returns `false` once the stream is closed and drained.
    pub async fn receive(&mut self) -> bool {
        while !self.has_available() {
            if self.closed {
                return false;
            }
            match self.rx.receive().await {
                Some(chunk) => {
                    tracing::trace!(len = chunk.len(), offset = self.received, "chunk received");
                    self.received += chunk.len() as u64;
                    self.input = chunk;
                    self.pos = 0;
                }
                None => {
                    self.closed = true;
                    self.input = Bytes::new();
                    self.pos = 0;
                    return false;
                }
            }
        }
        true
    }

    /// `true` once no byte will ever be available again.
    pub async fn at_end(&mut self) -> bool {
        !self.receive().await
    }

    // ── Window operations ──────────────────────────────────────────────

    /// Up to `max` bytes of the current window, without advancing.
    #[must_use]
    pub fn peek_available(&self, max: usize) -> Bytes {
        let end = self.input.len().min(self.pos.saturating_add(max));
        self.input.slice(self.pos..end)
    }

    /// Up to `max` bytes of the current window, advancing past them.
    pub fn read_available(&mut self, max: usize) -> Bytes {
        let out = self.peek_available(max);
        self.pos += out.len();
        out
    }

    /// The window up to the first byte matching `pred`, capped at `max`
    /// bytes, without advancing.
    ///
    /// The flag is `true` when the byte right after the returned slice is
    /// the delimiter.
    #[must_use]
    pub fn available_until<P: BytePredicate>(&self, pred: &P, max: usize) -> (Bytes, bool) {
        let end = self.input.len().min(self.pos.saturating_add(max));
        let window = &self.input[self.pos..end];
        match pred.position_in(window) {
            Some(n) => (self.input.slice(self.pos..self.pos + n), true),
            None => (self.input.slice(self.pos..end), false),
        }
    }

    /// Zero-copy fast path of [`read_until`](Self::read_until).
    ///
    /// If the delimiter lies in the current window, returns the bytes
    /// before it and leaves the cursor on the delimiter. Otherwise returns
    /// `None` and does not move.
    pub fn read_available_until<P: BytePredicate>(&mut self, pred: &P) -> Option<Bytes> {
        let (slice, found) = self.available_until(pred, usize::MAX);
        if !found {
            return None;
        }
        self.pos += slice.len();
        Some(slice)
    }

    /// Advance by up to `n` bytes inside the current window. Returns the
    /// number skipped.
    pub fn skip_available(&mut self, n: usize) -> usize {
        let n = n.min(self.available());
        self.pos += n;
        n
    }

    // ── Suspending operations ──────────────────────────────────────────

    pub async fn peek_byte(&mut self) -> Option<u8> {
        if self.receive().await {
            Some(self.input[self.pos])
        } else {
            None
        }
    }

    pub async fn read_byte(&mut self) -> Option<u8> {
        let byte = self.peek_byte().await?;
        self.pos += 1;
        Some(byte)
    }

    /// Consume one byte if it equals `expected`.
    pub async fn skip_byte(&mut self, expected: u8) -> bool {
        if self.peek_byte().await == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip a run of bytes matching `pred`. Returns the run length.
    pub async fn skip_while<P: BytePredicate>(&mut self, pred: &P) -> u64 {
        let mut skipped = 0u64;
        while self.receive().await {
            let window = &self.input[self.pos..];
            let run = window
                .iter()
                .position(|&b| !pred.matches(b))
                .unwrap_or(window.len());
            self.pos += run;
            skipped += run as u64;
            if self.has_available() {
                break;
            }
        }
        skipped
    }

    /// Skip `n` bytes, or fewer if the stream ends first.
    pub async fn skip_n(&mut self, n: u64) -> u64 {
        let mut left = n;
        while left > 0 && self.receive().await {
            let step = usize::try_from(left).unwrap_or(usize::MAX);
            left -= self.skip_available(step) as u64;
        }
        n - left
    }

    /// Skip past the next `\n`. Returns `false` if the stream ended first.
    pub async fn skip_line(&mut self) -> bool {
        self.skip_while(&|b: u8| b != b'\n').await;
        self.skip_byte(b'\n').await
    }

    /// Consume bytes while they equal `reference`, stopping at the first
    /// mismatch, the end of `reference`, or the end of the stream.
    ///
    /// Returns how many bytes matched.
    pub async fn skip_common_prefix(&mut self, reference: &[u8]) -> usize {
        let mut matched = 0;
        while matched < reference.len() && self.receive().await {
            let window = &self.input[self.pos..];
            let want = &reference[matched..];
            let run = window.iter().zip(want).take_while(|(a, b)| a == b).count();
            self.pos += run;
            matched += run;
            if run < window.len().min(want.len()) {
                break;
            }
        }
        matched
    }

    /// Feed consecutive ASCII digits to `acc`. Returns the digit count;
    /// when it is zero `acc` was never called.
    pub async fn read_digits<A: Accumulator>(&mut self, acc: &mut A) -> usize {
        let mut count = 0;
        while self.receive().await {
            let window = &self.input[self.pos..];
            let run = window
                .iter()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or(window.len());
            for &b in &window[..run] {
                acc.push_digit(b - b'0');
            }
            self.pos += run;
            count += run;
            if self.has_available() {
                break;
            }
        }
        count
    }

    /// An optionally signed decimal `i32`. `None` when no digit follows.
    pub async fn read_int(&mut self) -> Option<i32> {
        let negative = self.read_sign().await;
        let mut value = 0i32;
        if self.read_digits(&mut value).await == 0 {
            return None;
        }
        Some(if negative { value.wrapping_neg() } else { value })
    }

    /// An optionally signed decimal `i64`. `None` when no digit follows.
    pub async fn read_long(&mut self) -> Option<i64> {
        let negative = self.read_sign().await;
        let mut value = 0i64;
        if self.read_digits(&mut value).await == 0 {
            return None;
        }
        Some(if negative { value.wrapping_neg() } else { value })
    }

    async fn read_sign(&mut self) -> bool {
        match self.peek_byte().await {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        }
    }

    /// Copy bytes into `sink` up to (not including) the first byte
    /// matching `pred`, across as many chunks as it takes.
    ///
    /// Use [`read_available_until`](Self::read_available_until) first when
    /// a zero-copy slice of the current chunk is good enough.
    pub async fn read_until<S, P>(&mut self, sink: &mut S, pred: &P) -> Until
    where
        S: ByteSink + ?Sized,
        P: BytePredicate,
    {
        while self.receive().await {
            let window = &self.input[self.pos..];
            let (end, found) = match pred.position_in(window) {
                Some(n) => (n, true),
                None => (window.len(), false),
            };
            let room = sink.remaining();
            if end > room {
                sink.put(&window[..room]);
                self.pos += room;
                return Until::SinkFull;
            }
            sink.put(&window[..end]);
            self.pos += end;
            if found {
                return Until::Found;
            }
        }
        Until::Eof
    }

    /// Copy the rest of the stream into `sink`.
    pub async fn read_to_end<S: ByteSink + ?Sized>(&mut self, sink: &mut S) -> Until {
        while self.receive().await {
            let room = sink.remaining();
            if room == 0 {
                return Until::SinkFull;
            }
            let part = self.read_available(room);
            sink.put(&part);
        }
        Until::Eof
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("available", &self.available())
            .field("bytes_consumed", &self.bytes_consumed())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_class::{SPACE, TOKEN_END};
    use crate::sink::FixedSink;

    fn scanner_over(chunks: &[&'static [u8]]) -> Scanner {
        let (mut tx, scanner) = Scanner::channel();
        let chunks: Vec<Bytes> = chunks.iter().map(|c| Bytes::from_static(c)).collect();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(chunk).await.is_err() {
                    return;
                }
            }
            let _ = tx.close().await;
        });
        scanner
    }

    #[tokio::test]
    async fn bytes_flow_across_chunks() {
        let mut s = scanner_over(&[b"ab", b"c"]);
        assert_eq!(s.read_byte().await, Some(b'a'));
        assert_eq!(s.peek_byte().await, Some(b'b'));
        assert_eq!(s.read_byte().await, Some(b'b'));
        assert_eq!(s.bytes_consumed(), 2);
        assert_eq!(s.read_byte().await, Some(b'c'));
        assert_eq!(s.read_byte().await, None);
        assert!(s.is_closed());
        assert_eq!(s.bytes_consumed(), 3);
    }

    #[tokio::test]
    async fn skip_byte_leaves_cursor_on_mismatch() {
        let mut s = scanner_over(&[b"<1"]);
        assert!(!s.skip_byte(b'1').await);
        assert!(s.skip_byte(b'<').await);
        assert!(s.skip_byte(b'1').await);
        assert!(!s.skip_byte(b'>').await);
    }

    #[tokio::test]
    async fn skip_while_spans_chunks() {
        let mut s = scanner_over(&[b"  ", b"\t\x08", b" x"]);
        assert_eq!(s.skip_while(&SPACE).await, 5);
        assert_eq!(s.read_byte().await, Some(b'x'));
    }

    #[tokio::test]
    async fn common_prefix_across_boundary() {
        let mut s = scanner_over(&[b"loc", b"alhost app"]);
        assert_eq!(s.skip_common_prefix(b"localhost").await, 9);
        assert_eq!(s.peek_byte().await, Some(b' '));

        let mut s = scanner_over(&[b"loc", b"k"]);
        assert_eq!(s.skip_common_prefix(b"localhost").await, 3);
        assert_eq!(s.peek_byte().await, Some(b'k'));

        let mut s = scanner_over(&[b"lo"]);
        assert_eq!(s.skip_common_prefix(b"localhost").await, 2);
        assert!(s.at_end().await);
    }

    #[tokio::test]
    async fn signed_integers() {
        let mut s = scanner_over(&[b"+1", b"2 -7 - 2147483648"]);
        assert_eq!(s.read_int().await, Some(12));
        s.skip_while(&SPACE).await;
        assert_eq!(s.read_long().await, Some(-7));
        s.skip_while(&SPACE).await;
        assert_eq!(s.read_int().await, None);
        s.skip_while(&SPACE).await;
        assert_eq!(s.read_int().await, Some(i32::MIN));
    }

    #[tokio::test]
    async fn integers_without_digits_are_invalid() {
        let mut s = scanner_over(&[b"+", b"x-", b"y", b"99999999999"]);
        assert_eq!(s.read_int().await, None);
        assert_eq!(s.read_byte().await, Some(b'x'));
        assert_eq!(s.read_long().await, None);
        assert_eq!(s.read_byte().await, Some(b'y'));
        assert_eq!(s.read_long().await, Some(99_999_999_999));
    }

    #[tokio::test]
    async fn accumulator_untouched_without_digits() {
        let mut s = scanner_over(&[b"x1"]);
        let mut calls = 0;
        let mut acc = |_: u8| calls += 1;
        assert_eq!(s.read_digits(&mut acc).await, 0);
        assert_eq!(calls, 0);
        assert_eq!(s.peek_byte().await, Some(b'x'));
    }

    #[tokio::test]
    async fn digits_split_mid_number() {
        let mut s = scanner_over(&[b"1", b"2", b"3>"]);
        let mut pri = 0u32;
        assert_eq!(s.read_digits(&mut pri).await, 3);
        assert_eq!(pri, 123);
        assert!(s.skip_byte(b'>').await);
    }

    #[tokio::test]
    async fn read_until_copies_across_chunks() {
        let mut s = scanner_over(&[b"my", b"ap", b"p rest"]);
        let mut token = Vec::new();
        assert_eq!(s.read_until(&mut token, &TOKEN_END).await, Until::Found);
        assert_eq!(token, b"myapp");
        assert_eq!(s.peek_byte().await, Some(b' '));
    }

    #[tokio::test]
    async fn read_until_reports_eof_and_full_sink() {
        let mut s = scanner_over(&[b"abc", b"def"]);
        let mut storage = [0u8; 4];
        let mut sink = FixedSink::new(&mut storage);
        assert_eq!(s.read_until(&mut sink, &TOKEN_END).await, Until::SinkFull);
        assert_eq!(sink.filled(), b"abcd");
        assert_eq!(s.peek_byte().await, Some(b'e'));

        let mut rest = Vec::new();
        assert_eq!(s.read_until(&mut rest, &TOKEN_END).await, Until::Eof);
        assert_eq!(rest, b"ef");
    }

    #[tokio::test]
    async fn available_until_is_zero_copy() {
        static CHUNK: &[u8] = b"host app";
        let mut s = scanner_over(&[CHUNK]);
        assert!(s.receive().await);
        let token = s.read_available_until(&TOKEN_END).unwrap();
        assert_eq!(&token[..], b"host");
        assert_eq!(token.as_ptr(), CHUNK.as_ptr());
        assert_eq!(s.peek_available(1), " ");
        s.skip_available(1);
        assert_eq!(s.read_available_until(&TOKEN_END), None);
        assert_eq!(s.available_until(&TOKEN_END, 2), (Bytes::from_static(b"ap"), false));
        assert_eq!(s.read_available(10), "app");
    }

    #[tokio::test]
    async fn skip_line_and_read_to_end() {
        let mut s = scanner_over(&[b"msg1", b"\nnext", b" line"]);
        assert!(s.skip_line().await);
        assert_eq!(s.bytes_consumed(), 5);
        let mut rest = Vec::new();
        assert_eq!(s.read_to_end(&mut rest).await, Until::Eof);
        assert_eq!(rest, b"next line");
        assert!(!s.skip_line().await);
    }

    #[tokio::test]
    async fn skip_n_stops_at_end() {
        let mut s = scanner_over(&[b"abc", b"de"]);
        assert_eq!(s.skip_n(4).await, 4);
        assert_eq!(s.skip_n(10).await, 1);
        assert!(s.at_end().await);
    }
}

/// Destination for bytes copied out of the scanner.
///
/// When a token does not fit in the current chunk the scanner copies it,
/// one chunk at a time, into a `ByteSink`. The scanner never puts more
/// than [`remaining`](ByteSink::remaining) bytes in a single call.
///
/// ```text
/// ┌──────────────────┬───────────────────────────────────────────────┐
/// │ Sink             │ remaining()                                   │
/// ├──────────────────┼───────────────────────────────────────────────┤
/// │ Vec<u8>          │ unbounded                                     │
/// │ FixedSink        │ unfilled part of a caller-supplied &mut [u8]  │
/// │ GrowableBuffer   │ up to the buffer's maximum capacity           │
/// │ Limited<S>       │ min(limit left, inner.remaining())            │
/// └──────────────────┴───────────────────────────────────────────────┘
/// ```
pub trait ByteSink {
    /// How many more bytes this sink accepts.
    fn remaining(&self) -> usize;

    /// Append `bytes`. `bytes.len()` never exceeds `remaining()`.
    fn put(&mut self, bytes: &[u8]);

    /// Cap this sink at `limit` further bytes.
    fn limited(&mut self, limit: usize) -> Limited<'_, Self>
    where
        Self: Sized,
    {
        Limited { inner: self, left: limit }
    }
}

impl ByteSink for Vec<u8> {
    fn remaining(&self) -> usize {
        usize::MAX - self.len()
    }

    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// A sink over a fixed, caller-owned byte slice.
#[derive(Debug)]
pub struct FixedSink<'a> {
    buf: &'a mut [u8],
    filled: usize,
}

impl<'a> FixedSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, filled: 0 }
    }

    /// The bytes written so far.
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn clear(&mut self) {
        self.filled = 0;
    }
}

impl ByteSink for FixedSink<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.filled
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.filled + bytes.len();
        self.buf[self.filled..end].copy_from_slice(bytes);
        self.filled = end;
    }
}

/// Adapter returned by [`ByteSink::limited`].
#[derive(Debug)]
pub struct Limited<'a, S> {
    inner: &'a mut S,
    left: usize,
}

impl<S: ByteSink> ByteSink for Limited<'_, S> {
    fn remaining(&self) -> usize {
        self.left.min(self.inner.remaining())
    }

    fn put(&mut self, bytes: &[u8]) {
        self.left -= bytes.len();
        self.inner.put(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sink_tracks_fill() {
        let mut storage = [0u8; 4];
        let mut sink = FixedSink::new(&mut storage);
        assert_eq!(sink.remaining(), 4);
        sink.put(b"ab");
        assert_eq!(sink.filled(), b"ab");
        assert_eq!(sink.remaining(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn limited_caps_remaining() {
        let mut vec = Vec::new();
        let mut limited = vec.limited(3);
        assert_eq!(limited.remaining(), 3);
        limited.put(b"xy");
        assert_eq!(limited.remaining(), 1);
        assert_eq!(vec, b"xy");
    }
}

/// A text destination bounded by a number of characters.
///
/// Decoders stop with [`CoderResult::Overflow`](crate::CoderResult::Overflow)
/// once it is full; the caller drains it and decodes on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharBuffer {
    text: String,
    chars: usize,
    capacity: usize,
}

impl CharBuffer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            chars: 0,
            capacity,
        }
    }

    /// Capacity in characters.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Characters still accepted.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.chars
    }

    /// Characters held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.chars == self.capacity
    }

    /// Append one character. Returns `false` when full.
    pub fn push(&mut self, c: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.text.push(c);
        self.chars += 1;
        true
    }

    /// Append as much of `s` as fits. Returns the number of *bytes* of
    /// `s` taken, always on a character boundary.
    pub fn push_prefix(&mut self, s: &str) -> usize {
        let room = self.remaining();
        if s.len() <= room {
            self.text.push_str(s);
            self.chars += s.chars().count();
            return s.len();
        }
        let end = s
            .char_indices()
            .nth(room)
            .map_or(s.len(), |(index, _)| index);
        let taken = &s[..end];
        self.text.push_str(taken);
        self.chars += taken.chars().count();
        end
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.chars = 0;
    }

    /// Move the content to the end of `out`, leaving this buffer empty.
    pub fn drain_into(&mut self, out: &mut String) {
        out.push_str(&self.text);
        self.clear();
    }

    /// Take the content, leaving this buffer empty with the same capacity.
    pub fn take(&mut self) -> String {
        self.chars = 0;
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_stops_on_char_boundary() {
        let mut buf = CharBuffer::with_capacity(2);
        assert_eq!(buf.push_prefix("a€b"), 4);
        assert_eq!(buf.as_str(), "a€");
        assert!(buf.is_full());
        assert!(!buf.push('c'));
    }

    #[test]
    fn drain_empties() {
        let mut buf = CharBuffer::with_capacity(8);
        buf.push_prefix("host");
        let mut out = String::from(">");
        buf.drain_into(&mut out);
        assert_eq!(out, ">host");
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), 8);
    }
}

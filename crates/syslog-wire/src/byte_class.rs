/// Anything that can classify a single byte.
///
/// Scanner searches (`skip_while`, `read_until`, ...) are generic over this
/// trait so a caller can pass either a precomputed [`ByteClass`] lookup table
/// or an ad-hoc closure:
///
/// ```
/// use syslog_wire::byte_class::{BytePredicate, ByteClass};
///
/// let table = ByteClass::of(b"=]");
/// let closure = |b: u8| b == b'=' || b == b']';
/// assert_eq!(table.matches(b']'), closure.matches(b']'));
/// ```
pub trait BytePredicate {
    fn matches(&self, byte: u8) -> bool;

    /// Index of the first matching byte in `haystack`.
    fn position_in(&self, haystack: &[u8]) -> Option<usize> {
        haystack.iter().position(|&b| self.matches(b))
    }
}

impl<F: Fn(u8) -> bool> BytePredicate for F {
    #[inline]
    fn matches(&self, byte: u8) -> bool {
        self(byte)
    }
}

/// A 256-entry membership table, built at compile time.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────┐
/// │ Constant     │ Members                              │
/// ├──────────────┼──────────────────────────────────────┤
/// │ SPACE        │ ' ' '\t' '\x08' (backspace)          │
/// │ TOKEN_END    │ SPACE + '\n'                         │
/// │ DIGIT        │ '0'..='9'                            │
/// └──────────────┴──────────────────────────────────────┘
/// ```
///
/// Backspace counts as whitespace: senders in the wild emit it between
/// header fields and the grammar tolerates it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ByteClass {
    table: [bool; 256],
}

pub const SPACE: ByteClass = ByteClass::of(b" \t\x08");
pub const TOKEN_END: ByteClass = SPACE.with(b'\n');
pub const DIGIT: ByteClass = ByteClass::of(b"0123456789");

impl ByteClass {
    pub const EMPTY: ByteClass = ByteClass { table: [false; 256] };

    /// Build a class containing exactly the given bytes.
    #[must_use]
    pub const fn of(bytes: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut i = 0;
        while i < bytes.len() {
            table[bytes[i] as usize] = true;
            i += 1;
        }
        Self { table }
    }

    #[must_use]
    pub const fn with(mut self, byte: u8) -> Self {
        self.table[byte as usize] = true;
        self
    }

    #[must_use]
    pub const fn union(mut self, other: ByteClass) -> Self {
        let mut i = 0;
        while i < 256 {
            self.table[i] = self.table[i] || other.table[i];
            i += 1;
        }
        self
    }

    /// Every byte not in `self`.
    #[must_use]
    pub const fn complement(mut self) -> Self {
        let mut i = 0;
        while i < 256 {
            self.table[i] = !self.table[i];
            i += 1;
        }
        self
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, byte: u8) -> bool {
        self.table[byte as usize]
    }
}

impl BytePredicate for ByteClass {
    #[inline]
    fn matches(&self, byte: u8) -> bool {
        self.contains(byte)
    }
}

impl std::fmt::Debug for ByteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[allow(clippy::cast_possible_truncation)]
        let members = (0..256usize)
            .filter(|&i| self.table[i])
            .map(|i| std::ascii::escape_default(i as u8).to_string());
        f.debug_set().entries(members).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_includes_backspace() {
        assert!(SPACE.contains(b' '));
        assert!(SPACE.contains(b'\t'));
        assert!(SPACE.contains(0x08));
        assert!(!SPACE.contains(b'\n'));
        assert!(TOKEN_END.contains(b'\n'));
    }

    #[test]
    fn union_and_complement() {
        let class = ByteClass::of(b"ab").union(ByteClass::of(b"c"));
        assert!(class.contains(b'c'));
        assert!(!class.complement().contains(b'a'));
        assert!(class.complement().contains(b'z'));
        assert!(!ByteClass::EMPTY.contains(0));
    }

    #[test]
    fn position_in_finds_first_member() {
        assert_eq!(TOKEN_END.position_in(b"host app"), Some(4));
        assert_eq!(DIGIT.position_in(b"abc"), None);
        assert_eq!((|b: u8| b == b'p').position_in(b"app"), Some(1));
    }
}

use std::collections::HashMap;

use bytes::Bytes;

/// Raw bytes and decoded text of a HOSTNAME or APP-NAME from the previous
/// message.
///
/// Starts out holding the nil value `-`, so a stream of nil fields never
/// touches the decoder either.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldCache {
    raw: Vec<u8>,
    text: Option<String>,
}

impl Default for FieldCache {
    fn default() -> Self {
        Self {
            raw: b"-".to_vec(),
            text: None,
        }
    }
}

impl FieldCache {
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Decoded text, `None` for the nil value.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn store(&mut self, raw: &[u8], text: Option<String>) {
        self.raw.clear();
        self.raw.extend_from_slice(raw);
        self.text = text;
    }

    /// Back to the nil value.
    pub fn clear(&mut self) {
        self.store(b"-", None);
    }
}

/// Maps raw SD-ID and PARAM-NAME bytes to their decoded text.
///
/// Structured data repeats the same few names across messages, so a hit
/// here skips the decoder entirely. The table is dropped wholesale when it
/// reaches its limit.
#[derive(Debug)]
pub struct KeyInterner {
    keys: HashMap<Bytes, String>,
    limit: usize,
}

impl KeyInterner {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            keys: HashMap::new(),
            limit,
        }
    }

    #[must_use]
    pub fn get(&self, raw: &[u8]) -> Option<&str> {
        self.keys.get(raw).map(String::as_str)
    }

    /// Remember `text` for `raw`. The bytes are copied, so `raw` may be a
    /// view into a chunk that is about to be released.
    pub fn insert(&mut self, raw: &[u8], text: String) {
        if self.limit == 0 {
            return;
        }
        if self.keys.len() >= self.limit {
            tracing::debug!(entries = self.keys.len(), "key intern table full, clearing");
            self.keys.clear();
        }
        self.keys.insert(Bytes::copy_from_slice(raw), text);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_cache_starts_nil() {
        let mut cache = FieldCache::default();
        assert_eq!(cache.raw(), b"-");
        assert_eq!(cache.text(), None);
        cache.store(b"host", Some("host".into()));
        assert_eq!(cache.text(), Some("host"));
        cache.clear();
        assert_eq!(cache, FieldCache::default());
    }

    #[test]
    fn interner_clears_when_full() {
        let mut keys = KeyInterner::new(2);
        keys.insert(b"a", "a".into());
        keys.insert(b"b", "b".into());
        assert_eq!(keys.get(b"a"), Some("a"));
        keys.insert(b"c", "c".into());
        assert_eq!(keys.len(), 1);
        assert_eq!(keys.get(b"a"), None);
        assert_eq!(keys.get(b"c"), Some("c"));
    }

    #[test]
    fn zero_limit_disables_interning() {
        let mut keys = KeyInterner::new(0);
        keys.insert(b"a", "a".into());
        assert!(keys.is_empty());
    }
}

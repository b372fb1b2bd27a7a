use syslog_decoder::ErrorAction;

/// Configuration for [`SyslogParser`](crate::SyslogParser).
///
/// ```text
/// ┌────────────────────┬─────────┬─────────────────────────────────────────┐
/// │ Field              │ Default │ Purpose                                 │
/// ├────────────────────┼─────────┼─────────────────────────────────────────┤
/// │ on_malformed       │ Fail    │ Invalid byte sequences                  │
/// │ on_unmappable      │ Fail    │ Valid sequences without a character     │
/// │ max_token_len      │ 1024    │ Scratch bytes for one header token      │
/// │ value_buffer_chars │ 1024    │ Char buffer for SD values and the body  │
/// │ max_interned_keys  │ 4096    │ Key-intern table size before a reset    │
/// │ field_cache        │ true    │ Reuse host/app text of the last message │
/// └────────────────────┴─────────┴─────────────────────────────────────────┘
/// ```
///
/// `max_token_len` bounds HOSTNAME, APP-NAME, MSGID, SD-ID and PARAM-NAME.
/// A token longer than that is a fatal
/// [`ParseError::TokenTooLong`](crate::ParseError::TokenTooLong), whether or
/// not it crosses a chunk boundary. SD values are decoded in slices and are
/// not bounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Policy for malformed input in any decoded field.
    pub on_malformed: ErrorAction,

    /// Policy for unmappable input in any decoded field.
    pub on_unmappable: ErrorAction,

    /// Longest header token or SD name, in bytes.
    pub max_token_len: usize,

    /// Capacity of the character buffer values are decoded through.
    pub value_buffer_chars: usize,

    /// The key-intern table is cleared when it reaches this many entries.
    pub max_interned_keys: usize,

    /// Compare HOSTNAME and APP-NAME bytes against the previous message and
    /// skip decoding when they match.
    pub field_cache: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            on_malformed: ErrorAction::Fail,
            on_unmappable: ErrorAction::Fail,
            max_token_len: 1024,
            value_buffer_chars: 1024,
            max_interned_keys: 4096,
            field_cache: true,
        }
    }
}

impl ParserConfig {
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

    /// Zero is raised to one.
    #[must_use]
    pub fn with_max_token_len(mut self, len: usize) -> Self {
        self.max_token_len = len.max(1);
        self
    }

    /// Zero is raised to one.
    #[must_use]
    pub fn with_value_buffer_chars(mut self, chars: usize) -> Self {
        self.value_buffer_chars = chars.max(1);
        self
    }

    #[must_use]
    pub fn with_max_interned_keys(mut self, keys: usize) -> Self {
        self.max_interned_keys = keys;
        self
    }

    #[must_use]
    pub fn with_field_cache(mut self, enabled: bool) -> Self {
        self.field_cache = enabled;
        self
    }
}

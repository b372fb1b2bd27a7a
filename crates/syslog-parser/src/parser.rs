use bytes::Bytes;
use syslog_decoder::{CharBuffer, CoderResult, IncrementalDecoder};
use syslog_types::timestamp::fraction_to_nanos;
use syslog_types::{Message, TimestampParts};
use syslog_wire::byte_class::{ByteClass, SPACE, TOKEN_END};
use syslog_wire::{ByteSink, BytePredicate, ChunkSender, GrowableBuffer, Scanner, Until};

use crate::cache::{FieldCache, KeyInterner};
use crate::config::ParserConfig;
use crate::error::ParseError;

// ── Delimiters ────────────────────────────────────────────────────────

const SD_ID_END: ByteClass = TOKEN_END.with(b']');
const PARAM_NAME_END: ByteClass = ByteClass::of(b"=]\n");
const QUOTED_STOP: ByteClass = ByteClass::of(b"\\\"\n");
const UNQUOTED_END: ByteClass = SD_ID_END;
const NEWLINE: ByteClass = ByteClass::of(b"\n");

/// Grammar states, visited in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Pri,
    Version,
    Timestamp,
    Hostname,
    AppName,
    ProcId,
    MsgId,
    StructuredData,
}

impl State {
    const SEQUENCE: [State; 8] = [
        State::Pri,
        State::Version,
        State::Timestamp,
        State::Hostname,
        State::AppName,
        State::ProcId,
        State::MsgId,
        State::StructuredData,
    ];
}

/// How a value decode run ended.
enum Run {
    /// The scanner sits on the delimiter.
    Delimiter,
    Eof,
    /// Bad input under the `Fail` policy.
    Invalid,
}

/// Incremental RFC 5424 parser.
///
/// Reads one message header per [`parse`](Self::parse) call from a
/// [`Scanner`], suspending whenever the current chunk runs dry:
///
/// ```text
///   Pri → Version → Timestamp → Hostname → AppName → ProcId → MsgId
///                                                              │
///                              Done ◀── StructuredData ◀──────┘
///                                        (loops per [element])
/// ```
///
/// The MSG body is left in the stream. Call [`read_body`](Self::read_body)
/// or [`skip_message`](Self::skip_message) before the next `parse`. A
/// failed parse never resynchronizes on its own either; the usual recovery
/// is `skip_message`.
///
/// Two caches avoid decoding what was decoded before:
/// - HOSTNAME and APP-NAME bytes are compared against the previous
///   message's and the previous text is reused on a full match;
/// - SD-IDs and PARAM-NAMEs go through a raw-bytes → text intern table.
///
/// Neither changes the parsed result, for any chunking of the input.
pub struct SyslogParser {
    scanner: Scanner,
    decoder: IncrementalDecoder,
    config: ParserConfig,
    message: Message,
    /// Token bytes that straddle a chunk boundary are assembled here.
    scratch: GrowableBuffer,
    /// Decode buffer for SD values and the body.
    text: CharBuffer,
    /// Decode buffer for single tokens.
    token_text: CharBuffer,
    host: FieldCache,
    app: FieldCache,
    keys: KeyInterner,
}

impl SyslogParser {
    pub fn new(scanner: Scanner) -> Self {
        Self::with_config(scanner, ParserConfig::default())
    }

    pub fn with_config(scanner: Scanner, config: ParserConfig) -> Self {
        let decoder = IncrementalDecoder::default()
            .with_on_malformed(config.on_malformed)
            .with_on_unmappable(config.on_unmappable);
        Self {
            scanner,
            decoder,
            message: Message::default(),
            scratch: GrowableBuffer::new(),
            text: CharBuffer::with_capacity(config.value_buffer_chars.max(1)),
            token_text: CharBuffer::with_capacity(config.max_token_len.max(1)),
            host: FieldCache::default(),
            app: FieldCache::default(),
            keys: KeyInterner::new(config.max_interned_keys),
            config,
        }
    }

    /// A parser plus the sender that feeds it.
    #[must_use]
    pub fn pipeline(config: ParserConfig) -> (ChunkSender, Self) {
        let (tx, scanner) = Scanner::channel();
        (tx, Self::with_config(scanner, config))
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The record filled by the last [`parse`](Self::parse).
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Decoder counters show how much text was actually decoded.
    #[must_use]
    pub fn decoder(&self) -> &IncrementalDecoder {
        &self.decoder
    }

    pub fn scanner_mut(&mut self) -> &mut Scanner {
        &mut self.scanner
    }

    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.scanner.bytes_consumed()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.scanner.is_closed()
    }

    /// `true` once the stream is closed and fully consumed.
    pub async fn at_end(&mut self) -> bool {
        self.scanner.at_end().await
    }

    /// Skip the rest of the current line, newline included. Returns
    /// `false` if the stream ended first.
    pub async fn skip_message(&mut self) -> bool {
        self.scanner.skip_line().await
    }

    /// Decode the MSG body up to the end of the line into `out` and
    /// consume the newline. A leading byte-order mark is dropped.
    ///
    /// Returns `false` on bad input under the `Fail` policy; the cursor is
    /// then somewhere inside the line.
    ///
    /// # Errors
    ///
    /// [`ParseError::Decode`] on decoder misuse.
    pub async fn read_body(&mut self, out: &mut String) -> Result<bool, ParseError> {
        self.decoder.discard_pending();
        let start = out.len();
        if let Run::Invalid = self.decode_run(out, &NEWLINE).await? {
            return Ok(false);
        }
        self.scanner.skip_byte(b'\n').await;
        if out[start..].starts_with('\u{FEFF}') {
            out.replace_range(start..start + '\u{FEFF}'.len_utf8(), "");
        }
        Ok(true)
    }

    /// Parse one message header (everything up to the MSG body).
    ///
    /// Returns `Ok(false)` when the input does not follow the grammar; the
    /// message record is unspecified in that case. A failed parse never
    /// consumes the newline ending the line it failed on.
    ///
    /// # Errors
    ///
    /// [`ParseError::TokenTooLong`] and [`ParseError::Decode`] are fatal
    /// and mean the pipeline should stop.
    pub async fn parse(&mut self) -> Result<bool, ParseError> {
        self.message.reset();
        self.decoder.discard_pending();
        let start = self.scanner.bytes_consumed();

        for state in State::SEQUENCE {
            let matched = match state {
                State::Pri => self.parse_pri().await,
                State::Version => self.parse_version().await,
                State::Timestamp => self.parse_timestamp().await,
                State::Hostname => self.parse_host().await?,
                State::AppName => self.parse_app().await?,
                State::ProcId => self.parse_proc_id().await,
                State::MsgId => self.parse_msg_id().await?,
                State::StructuredData => self.parse_structured_data().await?,
            };
            if !matched {
                tracing::debug!(
                    ?state,
                    start,
                    offset = self.scanner.bytes_consumed(),
                    "message does not match RFC 5424"
                );
                return Ok(false);
            }
            if !matches!(state, State::Pri | State::Version) {
                self.scanner.skip_while(&SPACE).await;
            }
        }
        Ok(true)
    }

    // ── Header fields ──────────────────────────────────────────────────

    async fn parse_pri(&mut self) -> bool {
        let s = &mut self.scanner;
        let mut pri = 0u32;
        if !s.skip_byte(b'<').await || s.read_digits(&mut pri).await == 0 || !s.skip_byte(b'>').await {
            return false;
        }
        self.message.pri = pri;
        true
    }

    async fn parse_version(&mut self) -> bool {
        self.scanner.skip_byte(b'1').await && self.scanner.skip_while(&SPACE).await > 0
    }

    async fn parse_timestamp(&mut self) -> bool {
        let mut parts = TimestampParts::default();
        if self.scanner.read_digits(&mut parts.year).await == 0 {
            return self.skip_nil().await;
        }

        let s = &mut self.scanner;
        let date_time = s.skip_byte(b'-').await
            && s.read_digits(&mut parts.month).await > 0
            && s.skip_byte(b'-').await
            && s.read_digits(&mut parts.day).await > 0
            && s.skip_byte(b'T').await
            && s.read_digits(&mut parts.hour).await > 0
            && s.skip_byte(b':').await
            && s.read_digits(&mut parts.minute).await > 0
            && s.skip_byte(b':').await
            && s.read_digits(&mut parts.second).await > 0;
        if !date_time {
            return false;
        }

        if s.skip_byte(b'.').await {
            let mut fraction = 0u32;
            let digits = s.read_digits(&mut fraction).await;
            if digits == 0 || digits > 9 {
                return false;
            }
            parts.nanos = fraction_to_nanos(fraction, digits);
        }

        let zone = s.peek_byte().await;
        if matches!(zone, Some(b'Z' | b'+' | b'-')) {
            s.skip_available(1);
        }
        parts.offset_seconds = match zone {
            Some(b'Z') => 0,
            Some(sign @ (b'+' | b'-')) => {
                let Some(offset) = read_offset(s).await else {
                    return false;
                };
                if sign == b'-' { offset.wrapping_neg() } else { offset }
            }
            _ => return false,
        };

        let Some(timestamp) = parts.assemble() else {
            return false;
        };
        if !self.at_delimiter().await {
            return false;
        }
        self.message.timestamp = Some(timestamp);
        true
    }

    async fn parse_host(&mut self) -> Result<bool, ParseError> {
        let mut cache = std::mem::take(&mut self.host);
        let outcome = self.read_cached(&mut cache).await;
        self.message.host = cache.text().map(str::to_owned);
        self.host = cache;
        outcome
    }

    async fn parse_app(&mut self) -> Result<bool, ParseError> {
        let mut cache = std::mem::take(&mut self.app);
        let outcome = self.read_cached(&mut cache).await;
        self.message.app = cache.text().map(str::to_owned);
        self.app = cache;
        outcome
    }

    async fn parse_proc_id(&mut self) -> bool {
        let mut id = 0u64;
        if self.scanner.read_digits(&mut id).await == 0 {
            return self.skip_nil().await;
        }
        if !self.at_delimiter().await {
            return false;
        }
        self.message.proc_id = Some(id);
        true
    }

    async fn parse_msg_id(&mut self) -> Result<bool, ParseError> {
        let raw = self.read_token(&[], &TOKEN_END).await?;
        match &raw[..] {
            b"" => Ok(false),
            b"-" => Ok(true),
            _ => {
                let Some(text) = self.decode_token(&raw)? else {
                    return Ok(false);
                };
                self.message.msg_id = Some(text);
                Ok(true)
            }
        }
    }

    // ── Structured data ────────────────────────────────────────────────

    async fn parse_structured_data(&mut self) -> Result<bool, ParseError> {
        let mut elements = 0usize;
        while self.scanner.skip_byte(b'[').await {
            elements += 1;
            if !self.parse_element().await? {
                return Ok(false);
            }
        }
        if elements == 0 {
            return Ok(self.skip_nil().await);
        }
        Ok(true)
    }

    /// One `[SD-ID PARAM="VALUE" ...]`, after the opening bracket.
    async fn parse_element(&mut self) -> Result<bool, ParseError> {
        let raw = self.read_token(&[], &SD_ID_END).await?;
        if raw.is_empty() {
            return Ok(false);
        }
        let Some(id) = self.intern(&raw)? else {
            return Ok(false);
        };
        self.message.structured_data.open(&id);

        loop {
            self.scanner.skip_while(&SPACE).await;
            if self.scanner.skip_byte(b']').await {
                return Ok(true);
            }

            let raw = self.read_token(&[], &PARAM_NAME_END).await?;
            let name = trim_space(&raw);
            if name.is_empty() {
                return Ok(false);
            }
            let Some(name) = self.intern(name)? else {
                return Ok(false);
            };
            if !self.scanner.skip_byte(b'=').await {
                return Ok(false);
            }

            self.decoder.discard_pending();
            let mut value = String::new();
            let complete = if self.scanner.skip_byte(b'"').await {
                self.read_quoted(&mut value).await?
            } else {
                self.read_unquoted(&mut value).await?
            };
            if !complete {
                return Ok(false);
            }
            self.message.structured_data.insert(&id, &name, value);
        }
    }

    /// A quoted value, after the opening quote, through the closing one.
    ///
    /// `\"` and `\\` are unescaped. Any other backslash, including the one
    /// in `\]`, is kept as is.
    async fn read_quoted(&mut self, value: &mut String) -> Result<bool, ParseError> {
        loop {
            if !matches!(self.decode_run(value, &QUOTED_STOP).await?, Run::Delimiter) {
                return Ok(false);
            }
            let delimiter = self.scanner.peek_byte().await;
            if delimiter == Some(b'\n') {
                return Ok(false);
            }
            self.scanner.skip_available(1);
            match delimiter {
                Some(b'"') => return Ok(true),
                Some(b'\\') => match self.scanner.peek_byte().await {
                    Some(escaped @ (b'"' | b'\\')) => {
                        self.scanner.skip_available(1);
                        value.push(char::from(escaped));
                    }
                    _ => value.push('\\'),
                },
                _ => return Ok(false),
            }
        }
    }

    /// An unquoted value, up to whitespace or `]`.
    async fn read_unquoted(&mut self, value: &mut String) -> Result<bool, ParseError> {
        if !matches!(self.decode_run(value, &UNQUOTED_END).await?, Run::Delimiter) {
            return Ok(false);
        }
        Ok(self.scanner.peek_byte().await != Some(b'\n'))
    }

    // ── Tokens ─────────────────────────────────────────────────────────

    /// HOSTNAME or APP-NAME through its field cache. On success `cache`
    /// describes the field just read.
    async fn read_cached(&mut self, cache: &mut FieldCache) -> Result<bool, ParseError> {
        let matched = if self.config.field_cache {
            self.scanner.skip_common_prefix(cache.raw()).await
        } else {
            0
        };
        if self.config.field_cache && matched == cache.raw().len() && self.at_delimiter().await {
            tracing::trace!(len = matched, "field cache hit");
            return Ok(true);
        }

        let raw = self.read_token(&cache.raw()[..matched], &TOKEN_END).await?;
        if raw.is_empty() {
            return Ok(false);
        }
        if raw[..] == b"-"[..] {
            cache.store(&raw, None);
            return Ok(true);
        }
        let Some(text) = self.decode_token(&raw)? else {
            return Ok(false);
        };
        cache.store(&raw, Some(text));
        Ok(true)
    }

    /// Raw bytes up to the next byte matching `pred`, which stays unread.
    /// `prefix` holds bytes of the token the caller already consumed.
    ///
    /// A token inside the current chunk comes back as a zero-copy slice;
    /// one crossing chunks is assembled in the scratch buffer.
    async fn read_token<P: BytePredicate>(
        &mut self,
        prefix: &[u8],
        pred: &P,
    ) -> Result<Bytes, ParseError> {
        let limit = self.config.max_token_len;
        if prefix.is_empty() {
            if let Some(slice) = self.scanner.read_available_until(pred) {
                if slice.len() > limit {
                    return Err(ParseError::TokenTooLong { limit });
                }
                return Ok(slice);
            }
        }

        self.scratch.clear();
        self.scratch.write(prefix);
        let room = limit.saturating_sub(prefix.len());
        let mut sink = self.scratch.limited(room);
        if self.scanner.read_until(&mut sink, pred).await == Until::SinkFull {
            return Err(ParseError::TokenTooLong { limit });
        }
        Ok(Bytes::from(self.scratch.to_vec()))
    }

    /// Decode a complete token. `None` on bad input under `Fail`.
    fn decode_token(&mut self, raw: &[u8]) -> Result<Option<String>, ParseError> {
        self.token_text.clear();
        match self.decoder.decode_complete(raw, &mut self.token_text)? {
            CoderResult::Underflow => Ok(Some(self.token_text.take())),
            _ => Ok(None),
        }
    }

    /// Decoded text of an SD-ID or PARAM-NAME, through the intern table.
    fn intern(&mut self, raw: &[u8]) -> Result<Option<String>, ParseError> {
        if let Some(text) = self.keys.get(raw) {
            return Ok(Some(text.to_owned()));
        }
        let Some(text) = self.decode_token(raw)? else {
            return Ok(None);
        };
        self.keys.insert(raw, text.clone());
        Ok(Some(text))
    }

    /// Decode through the value buffer into `out` until a byte matching
    /// `pred` is next.
    async fn decode_run<P: BytePredicate>(
        &mut self,
        out: &mut String,
        pred: &P,
    ) -> Result<Run, ParseError> {
        loop {
            let decoded = self
                .decoder
                .decode_until(&mut self.scanner, &mut self.text, pred)
                .await?;
            self.text.drain_into(out);
            match decoded.stop {
                CoderResult::Underflow => return Ok(Run::Delimiter),
                CoderResult::Overflow => {}
                CoderResult::Eof => return Ok(Run::Eof),
                CoderResult::Malformed(_) | CoderResult::Unmappable(_) => return Ok(Run::Invalid),
            }
        }
    }

    /// The nil value `-` as a complete token.
    async fn skip_nil(&mut self) -> bool {
        self.scanner.skip_byte(b'-').await && self.at_delimiter().await
    }

    /// Whitespace, newline or end of stream next.
    async fn at_delimiter(&mut self) -> bool {
        self.scanner
            .peek_byte()
            .await
            .is_none_or(|b| TOKEN_END.contains(b))
    }
}

/// `HH:MM` after the zone sign, as seconds.
async fn read_offset(s: &mut Scanner) -> Option<i32> {
    let mut hours = 0i32;
    let mut minutes = 0i32;
    if s.read_digits(&mut hours).await == 0
        || !s.skip_byte(b':').await
        || s.read_digits(&mut minutes).await == 0
        || !(0..60).contains(&minutes)
    {
        return None;
    }
    Some(hours.wrapping_mul(3600).wrapping_add(minutes * 60))
}

fn trim_space(raw: &[u8]) -> &[u8] {
    let start = raw.iter().position(|&b| !SPACE.contains(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|&b| !SPACE.contains(b)).map_or(start, |i| i + 1);
    &raw[start..end]
}

impl std::fmt::Debug for SyslogParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyslogParser")
            .field("scanner", &self.scanner)
            .field("config", &self.config)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

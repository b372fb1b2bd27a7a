use syslog_decoder::DecodeError;
use syslog_wire::WireError;

/// Fatal errors from [`SyslogParser::parse`](crate::SyslogParser::parse).
///
/// A message that does not follow the grammar is *not* an error: `parse`
/// returns `Ok(false)` and the caller decides how to resynchronize. These
/// variants mean the pipeline itself cannot continue.
///
/// ```text
///   ParseError
///   ├── TokenTooLong       ← token longer than the fixed scratch capacity
///   └── Decode(DecodeError) ← from syslog-decoder
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A header token or SD name is longer than
    /// [`ParserConfig::max_token_len`](crate::ParserConfig::max_token_len).
    #[error("token exceeds the {limit}-byte scratch capacity")]
    TokenTooLong { limit: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors from [`feed`](crate::feed()).
///
/// ```text
///   FeedError
///   ├── Io(std::io::Error) ← reading the source failed
///   └── Wire(WireError)    ← the chunk hand-off failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}

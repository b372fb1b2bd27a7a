use std::fmt;
use std::str::FromStr;

use crate::char_buffer::CharBuffer;

/// Outcome of one decode step.
///
/// ```text
/// ┌────────────────┬─────────────────────────────────────────────────┐
/// │ Result         │ Meaning                                         │
/// ├────────────────┼─────────────────────────────────────────────────┤
/// │ Underflow      │ input used up (or only a partial sequence left) │
/// │ Overflow       │ destination full, input remains                 │
/// │ Malformed(n)   │ n bytes at the stop position are not valid      │
/// │ Unmappable(n)  │ n bytes are valid but have no character         │
/// │ Eof            │ stream closed before the requested delimiter    │
/// └────────────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoderResult {
    Underflow,
    Overflow,
    Malformed(usize),
    Unmappable(usize),
    Eof,
}

impl CoderResult {
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Unmappable(_))
    }
}

/// What to do with malformed or unmappable input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorAction {
    /// Stop and report the error.
    #[default]
    Fail,
    /// Emit U+FFFD in place of the offending bytes.
    Replace,
    /// Drop the offending bytes.
    Ignore,
}

impl ErrorAction {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Replace => "replace",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "replace" => Ok(Self::Replace),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!(
                "unknown error action {other:?} (expected fail, replace or ignore)"
            )),
        }
    }
}

/// A stateless-between-calls byte-to-text decoder.
///
/// `decode` converts a prefix of `src` into `dst` and returns how many
/// bytes it used. It never applies an error policy itself: on bad input it
/// stops right before the offending bytes and reports their length.
///
/// When `end_of_input` is false an incomplete sequence at the end of `src`
/// is left unconsumed with [`CoderResult::Underflow`]; when true it is
/// reported as malformed.
pub trait DecodeEngine {
    fn decode(&mut self, src: &[u8], dst: &mut CharBuffer, end_of_input: bool)
    -> (CoderResult, usize);

    /// Forget any internal state.
    fn reset(&mut self) {}

    /// Longest incomplete sequence `decode` can leave unconsumed.
    fn max_pending(&self) -> usize;
}

/// UTF-8 via [`std::str::from_utf8`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Engine;

impl DecodeEngine for Utf8Engine {
    fn decode(
        &mut self,
        src: &[u8],
        dst: &mut CharBuffer,
        end_of_input: bool,
    ) -> (CoderResult, usize) {
        let (valid, error) = match std::str::from_utf8(src) {
            Ok(text) => (text, None),
            Err(e) => {
                let (head, _) = src.split_at(e.valid_up_to());
                let Ok(text) = std::str::from_utf8(head) else {
                    return (CoderResult::Malformed(1), 0);
                };
                (text, Some(e.error_len()))
            }
        };

        let used = dst.push_prefix(valid);
        if used < valid.len() {
            return (CoderResult::Overflow, used);
        }
        match error {
            None => (CoderResult::Underflow, used),
            Some(Some(len)) => (CoderResult::Malformed(len), used),
            Some(None) if end_of_input => (CoderResult::Malformed(src.len() - used), used),
            Some(None) => (CoderResult::Underflow, used),
        }
    }

    fn max_pending(&self) -> usize {
        3
    }
}

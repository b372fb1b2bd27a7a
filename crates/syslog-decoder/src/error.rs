/// Fatal misuse of the incremental decoder.
///
/// Malformed or unmappable input is *not* an error at this level: it is
/// reported as a [`CoderResult`](crate::CoderResult) and handled per the
/// configured [`ErrorAction`](crate::ErrorAction).
///
/// ```text
///   DecodeError
///   └── ScratchOverflow  ← partial sequence longer than the scratch buffer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A partial multi-byte sequence left at a chunk boundary does not fit
    /// in the fixed scratch buffer.
    ///
    /// Only an engine whose sequences are longer than the scratch capacity
    /// can trigger this; the UTF-8 engine never leaves more than 3 bytes.
    #[error("{pending} pending bytes exceed the {capacity}-byte scratch buffer")]
    ScratchOverflow { pending: usize, capacity: usize },
}

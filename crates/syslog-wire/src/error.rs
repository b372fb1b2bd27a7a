/// Misuse of the chunk hand-off between a producer and the scanner.
///
/// These are never caused by the bytes being parsed. They mean one side
/// of the pipeline broke the hand-off protocol (or went away), and the
/// pipeline should stop rather than retry.
///
/// ```text
///   WireError
///   ├── ChunkPending    ← send/close while the previous chunk is undrained
///   ├── SendAfterClose  ← send after close
///   └── Disconnected    ← the other half of the channel was dropped
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The previously sent chunk has not been drained by the consumer yet.
    ///
    /// Only reachable when an earlier `send` future was dropped before the
    /// consumer acknowledged the chunk.
    #[error("previous chunk of {len} bytes has not been drained")]
    ChunkPending { len: usize },

    /// `send` was called after `close`.
    #[error("chunk sent after the channel was closed")]
    SendAfterClose,

    /// The receiving (or sending) half was dropped mid hand-off.
    #[error("chunk channel disconnected")]
    Disconnected,
}

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::WireError;

/// One hand-off over the channel.
enum Handoff {
    /// A chunk plus the acknowledgement the consumer fires once drained.
    Chunk(Bytes, oneshot::Sender<()>),
    Close,
}

/// Create a connected rendezvous channel.
///
/// Exactly one chunk is in flight at a time. The producer's
/// [`send`](ChunkSender::send) returns only after the consumer has taken
/// the chunk *and* drained it, which the consumer signals implicitly by
/// asking for the next one.
///
/// ```text
///   Producer                        Consumer
///      │──send(chunk)──▶ [ChunkPending]    │
///      │   (suspended)                     │◀─receive() → chunk
///      │                                   │   ...scan chunk...
///      │◀──────────── drained ─────────────│◀─receive() (next)
///      │──close()──────▶ [Closed] ────────▶│   → None
/// ```
#[must_use]
pub fn rendezvous() -> (ChunkSender, ChunkReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (
        ChunkSender {
            tx,
            pending: None,
            closed: false,
        },
        ChunkReceiver {
            rx,
            ack: None,
            closed: false,
        },
    )
}

struct Pending {
    len: usize,
    drained: oneshot::Receiver<()>,
}

/// Producer half of [`rendezvous`].
pub struct ChunkSender {
    tx: mpsc::Sender<Handoff>,
    pending: Option<Pending>,
    closed: bool,
}

impl ChunkSender {
    /// Hand `chunk` to the consumer and wait until it has been drained.
    ///
    /// Empty chunks are accepted and dropped without a hand-off.
    ///
    /// # Errors
    ///
    /// - [`WireError::ChunkPending`] if an earlier `send` was cancelled
    ///   before its chunk was drained.
    /// - [`WireError::SendAfterClose`] after [`close`](Self::close).
    /// - [`WireError::Disconnected`] if the consumer went away.
    pub async fn send(&mut self, chunk: Bytes) -> Result<(), WireError> {
        if self.closed {
            return Err(WireError::SendAfterClose);
        }
        self.check_drained()?;
        if chunk.is_empty() {
            return Ok(());
        }

        let len = chunk.len();
        let (ack, drained) = oneshot::channel();
        self.tx
            .send(Handoff::Chunk(chunk, ack))
            .await
            .map_err(|_| WireError::Disconnected)?;
        tracing::trace!(len, "chunk handed off");

        // Recorded before suspending so a cancelled send leaves the
        // channel in the pending state.
        self.pending = Some(Pending { len, drained });
        self.wait_drained().await
    }

    /// Signal end-of-stream.
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`WireError::ChunkPending`] if a chunk is still undrained,
    /// [`WireError::Disconnected`] if the consumer went away.
    pub async fn close(&mut self) -> Result<(), WireError> {
        if self.closed {
            return Ok(());
        }
        self.check_drained()?;
        self.tx
            .send(Handoff::Close)
            .await
            .map_err(|_| WireError::Disconnected)?;
        self.closed = true;
        tracing::debug!("chunk channel closed by producer");
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether a previously sent chunk is still waiting to be drained.
    pub fn is_pending(&mut self) -> bool {
        matches!(self.check_drained(), Err(WireError::ChunkPending { .. }))
    }

    async fn wait_drained(&mut self) -> Result<(), WireError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        let outcome = (&mut pending.drained).await;
        self.pending = None;
        outcome.map_err(|_| WireError::Disconnected)
    }

    fn check_drained(&mut self) -> Result<(), WireError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        let len = pending.len;
        match pending.drained.try_recv() {
            Ok(()) => {
                self.pending = None;
                Ok(())
            }
            Err(TryRecvError::Empty) => Err(WireError::ChunkPending { len }),
            Err(TryRecvError::Closed) => Err(WireError::Disconnected),
        }
    }
}

/// Consumer half of [`rendezvous`].
pub struct ChunkReceiver {
    rx: mpsc::Receiver<Handoff>,
    ack: Option<oneshot::Sender<()>>,
    closed: bool,
}

impl ChunkReceiver {
    /// Release the current chunk and wait for the next one.
    ///
    /// Returns `None` once the producer closed the channel (or dropped its
    /// half). After that every call returns `None` immediately.
    pub async fn receive(&mut self) -> Option<Bytes> {
        self.release();
        if self.closed {
            return None;
        }
        match self.rx.recv().await {
            Some(Handoff::Chunk(chunk, ack)) => {
                self.ack = Some(ack);
                Some(chunk)
            }
            Some(Handoff::Close) | None => {
                self.closed = true;
                tracing::debug!("chunk stream closed");
                None
            }
        }
    }

    /// Tell the producer the current chunk is drained, without waiting
    /// for another one.
    pub fn release(&mut self) {
        if let Some(ack) = self.ack.take() {
            // The producer may already have given up; nothing to do then.
            let _ = ack.send(());
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

//! Shared helpers for the integration tests and benchmarks.
//!
//! Everything here drives the real pipeline: a producer task sends chunks
//! over the rendezvous channel and a [`SyslogParser`] consumes them.

use std::path::Path;

use bytes::Bytes;
use syslog_parser::{ParseError, ParserConfig, SyslogParser};
use syslog_types::Message;

/// One line of input as the parser saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed {
    /// Header plus decoded MSG body.
    Valid(Message, String),
    Invalid,
}

impl Parsed {
    /// The message, panicking on an invalid line.
    #[must_use]
    pub fn message(&self) -> &Message {
        match self {
            Self::Valid(message, _) => message,
            Self::Invalid => panic!("expected a valid message"),
        }
    }

    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Valid(_, body) => body,
            Self::Invalid => panic!("expected a valid message"),
        }
    }
}

/// Read a fixture from `tests/fixtures/`.
#[must_use]
pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

// ── Chunking ──────────────────────────────────────────────────────────────────

/// Split `input` at the given ascending offsets.
#[must_use]
pub fn split_at(input: &[u8], offsets: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(offsets.len() + 1);
    let mut start = 0;
    for &offset in offsets {
        chunks.push(Bytes::copy_from_slice(&input[start..offset]));
        start = offset;
    }
    chunks.push(Bytes::copy_from_slice(&input[start..]));
    chunks
}

/// Fixed-size chunks of `size` bytes (the last may be shorter).
#[must_use]
pub fn chunked(input: &[u8], size: usize) -> Vec<Bytes> {
    input
        .chunks(size.max(1))
        .map(Bytes::copy_from_slice)
        .collect()
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Feed `chunks` to a fresh parser and parse until the stream ends.
///
/// Invalid lines are skipped with [`SyslogParser::skip_message`], the way a
/// newline-framed consumer resynchronizes.
///
/// # Errors
///
/// The first fatal [`ParseError`].
pub async fn parse_chunks(chunks: Vec<Bytes>, config: ParserConfig) -> Result<Vec<Parsed>, ParseError> {
    let (mut tx, mut parser) = SyslogParser::pipeline(config);
    let producer = tokio::spawn(async move {
        for chunk in chunks {
            if tx.send(chunk).await.is_err() {
                return;
            }
        }
        let _ = tx.close().await;
    });

    let mut out = Vec::new();
    let result = drain(&mut parser, &mut out).await;
    drop(parser);
    let _ = producer.await;
    result.map(|()| out)
}

/// [`parse_chunks`] with the whole input in one chunk.
///
/// # Errors
///
/// See [`parse_chunks`].
pub async fn parse_whole(input: &[u8], config: ParserConfig) -> Result<Vec<Parsed>, ParseError> {
    parse_chunks(vec![Bytes::copy_from_slice(input)], config).await
}

async fn drain(parser: &mut SyslogParser, out: &mut Vec<Parsed>) -> Result<(), ParseError> {
    while !parser.at_end().await {
        if parser.parse().await? {
            let mut body = String::new();
            if parser.read_body(&mut body).await? {
                out.push(Parsed::Valid(parser.message().clone(), body));
                continue;
            }
        }
        out.push(Parsed::Invalid);
        parser.skip_message().await;
    }
    Ok(())
}

/// Run a future to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// If the runtime cannot be built.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build tokio runtime")
        .block_on(future)
}

/// A synthetic log of `count` messages cycling through a few hosts, apps
/// and structured-data shapes.
#[must_use]
pub fn synthetic_log(count: usize) -> Vec<u8> {
    let hosts = ["web-01", "web-02", "db-01"];
    let apps = ["nginx", "postgres", "sshd", "cron"];
    let mut out = Vec::new();
    for i in 0..count {
        let line = format!(
            "<{pri}>1 2024-03-{day:02}T12:{min:02}:{sec:02}.{frac:06}+02:00 {host} {app} {pid} ID{id} \
             [meta@32473 seq=\"{i}\" path=\"/var/log/x\\\"y\" lang=\"ü€\"][origin ip=\"10.0.0.{oct}\"] \
             request {i} handled\n",
            pri = 8 + i % 184,
            day = 1 + i % 28,
            min = i % 60,
            sec = (i / 60) % 60,
            frac = i % 1_000_000,
            host = hosts[i % hosts.len()],
            app = apps[(i / 3) % apps.len()],
            pid = 1000 + i % 50,
            id = i % 7,
            oct = i % 255,
        );
        out.extend_from_slice(line.as_bytes());
    }
    out
}

//! Shared input plumbing: open the source, spawn the feeder, and walk the
//! stream one line at a time.

use std::path::Path;

use anyhow::{Context, Result};
use syslog_parser::{FeedError, SyslogParser, feed};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

use crate::GlobalOptions;

/// Outcome of [`Session::next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// A valid message; its header is in [`SyslogParser::message`].
    Parsed,
    /// The line was not RFC 5424 and has been skipped.
    Rejected,
}

/// A parser running over one input, with its producer task.
pub struct Session {
    parser: SyslogParser,
    producer: JoinHandle<Result<u64, FeedError>>,
    line: u64,
}

impl Session {
    /// Open `file` (stdin for `None` or `-`) and start feeding it.
    pub async fn open(file: Option<&Path>, options: &GlobalOptions) -> Result<Self> {
        let reader: Box<dyn AsyncRead + Unpin + Send> = match file {
            Some(path) if path != Path::new("-") => Box::new(
                tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("cannot open {}", path.display()))?,
            ),
            _ => Box::new(tokio::io::stdin()),
        };

        let (sender, parser) = SyslogParser::pipeline(options.parser_config());
        let producer = tokio::spawn(feed(reader, sender, options.chunk_size));
        Ok(Self {
            parser,
            producer,
            line: 0,
        })
    }

    /// Parse the next line. The MSG body of a valid message is decoded into
    /// `body`. Returns `None` at end of input.
    pub async fn next(&mut self, body: &mut String) -> Result<Option<Line>> {
        if self.parser.at_end().await {
            return Ok(None);
        }
        self.line += 1;
        body.clear();

        let parsed = self
            .parser
            .parse()
            .await
            .with_context(|| format!("line {}", self.line))?;
        if parsed && self.parser.read_body(body).await? {
            return Ok(Some(Line::Parsed));
        }

        tracing::warn!(line = self.line, "skipping invalid message");
        self.parser.skip_message().await;
        Ok(Some(Line::Rejected))
    }

    /// 1-based number of the line last returned by [`next`](Self::next).
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn parser(&self) -> &SyslogParser {
        &self.parser
    }

    /// Wait for the producer and return the number of bytes it read.
    ///
    /// When the input was abandoned before its end, the producer is
    /// aborted and the bytes consumed so far are returned instead.
    pub async fn finish(self) -> Result<u64> {
        let consumed = self.parser.bytes_consumed();
        if !self.parser.is_closed() {
            drop(self.parser);
            self.producer.abort();
            return Ok(consumed);
        }
        let fed = self.producer.await.context("input task panicked")??;
        Ok(fed)
    }
}

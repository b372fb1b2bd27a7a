use bytes::Bytes;
use syslog_wire::ChunkSender;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::FeedError;

/// Read `reader` in chunks of up to `chunk_size` bytes and hand each one
/// to `sender`, closing the channel at end of input.
///
/// Every chunk is a fresh allocation: the parser may still hold views into
/// the previous one. Each `send` waits until the parser has drained the
/// chunk before the next read starts.
///
/// Returns the total number of bytes fed.
///
/// # Errors
///
/// [`FeedError::Io`] if the read fails and [`FeedError::Wire`] if the
/// parser side went away.
pub async fn feed<R>(mut reader: R, mut sender: ChunkSender, chunk_size: usize) -> Result<u64, FeedError>
where
    R: AsyncRead + Unpin,
{
    let chunk_size = chunk_size.max(1);
    let mut total = 0u64;
    loop {
        let mut buf = vec![0u8; chunk_size];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        buf.truncate(n);
        total += n as u64;
        sender.send(Bytes::from(buf)).await?;
    }
    sender.close().await?;
    tracing::debug!(bytes = total, chunk_size, "input fed");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParserConfig, SyslogParser};

    #[tokio::test]
    async fn feeds_a_reader_through_the_parser() {
        let input: &[u8] = b"<34>1 - host app - - -\n<35>1 - host app - - -\n";
        let (tx, mut parser) = SyslogParser::pipeline(ParserConfig::default());
        let producer = tokio::spawn(feed(input, tx, 5));

        let mut pris = Vec::new();
        while !parser.at_end().await {
            assert!(parser.parse().await.unwrap());
            pris.push(parser.message().pri);
            assert!(parser.skip_message().await);
        }
        assert_eq!(pris, [34, 35]);
        assert_eq!(producer.await.unwrap().unwrap(), input.len() as u64);
    }

    #[tokio::test]
    async fn dropped_parser_surfaces_as_wire_error() {
        let (tx, parser) = SyslogParser::pipeline(ParserConfig::default());
        drop(parser);
        let result = feed(&b"<1>1 - - - - -\n"[..], tx, 4).await;
        assert!(matches!(result, Err(FeedError::Wire(_))));
    }
}

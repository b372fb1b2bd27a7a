#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use syslog_parser::{ParserConfig, SyslogParser};
use syslog_types::Message;

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u16>,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Valid(Message, String),
    Invalid,
    Fatal,
}

async fn run(chunks: Vec<Bytes>) -> Vec<Outcome> {
    let (mut tx, mut parser) = SyslogParser::pipeline(ParserConfig::default().with_max_token_len(64));
    tokio::spawn(async move {
        for chunk in chunks {
            if tx.send(chunk).await.is_err() {
                return;
            }
        }
        let _ = tx.close().await;
    });

    let mut out = Vec::new();
    while !parser.at_end().await {
        match parser.parse().await {
            Ok(true) => {
                let mut body = String::new();
                match parser.read_body(&mut body).await {
                    Ok(true) => out.push(Outcome::Valid(parser.message().clone(), body)),
                    Ok(false) => {
                        out.push(Outcome::Invalid);
                        parser.skip_message().await;
                    }
                    Err(_) => {
                        out.push(Outcome::Fatal);
                        break;
                    }
                }
            }
            Ok(false) => {
                out.push(Outcome::Invalid);
                parser.skip_message().await;
            }
            Err(_) => {
                out.push(Outcome::Fatal);
                break;
            }
        }
    }
    out
}

// Fuzz target: the same bytes parsed whole and split at arbitrary offsets
// must give the same records.
fuzz_target!(|input: Input| {
    let mut offsets: Vec<usize> = input
        .splits
        .iter()
        .map(|&s| usize::from(s))
        .filter(|&s| s > 0 && s < input.data.len())
        .collect();
    offsets.sort_unstable();
    offsets.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for offset in offsets {
        chunks.push(Bytes::copy_from_slice(&input.data[start..offset]));
        start = offset;
    }
    chunks.push(Bytes::copy_from_slice(&input.data[start..]));

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let whole = runtime.block_on(run(vec![Bytes::copy_from_slice(&input.data)]));
    let split = runtime.block_on(run(chunks));
    assert_eq!(whole, split);
});

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use syslog_parser::{ParserConfig, SyslogParser};

// Fuzz target: SyslogParser over arbitrary bytes in one chunk.
//
// Catches bugs in:
// - Header state transitions on truncated input
// - Timestamp range handling and wraparound
// - Structured-data escape and termination handling
fuzz_target!(|data: &[u8]| {
    let input = Bytes::copy_from_slice(data);
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async move {
        let (mut tx, mut parser) = SyslogParser::pipeline(ParserConfig::default());
        tokio::spawn(async move {
            let _ = tx.send(input).await;
            let _ = tx.close().await;
        });
        while !parser.at_end().await {
            match parser.parse().await {
                Ok(true) => {
                    let mut body = String::new();
                    if !matches!(parser.read_body(&mut body).await, Ok(true)) {
                        parser.skip_message().await;
                    }
                }
                Ok(false) => {
                    parser.skip_message().await;
                }
                Err(_) => break,
            }
        }
    });
});

//! Field-cache and key-intern behavior, observed through the decoder
//! counters.

use bytes::Bytes;
use syslog_parser::{ParserConfig, SyslogParser};

/// Parse every line of `input` (skipping bodies) and return the parser for
/// inspection.
async fn run(input: &'static [u8], config: ParserConfig) -> (SyslogParser, Vec<(Option<String>, Option<String>)>) {
    let (mut tx, mut parser) = SyslogParser::pipeline(config);
    tokio::spawn(async move {
        tx.send(Bytes::from_static(input)).await.unwrap();
        tx.close().await.unwrap();
    });

    let mut fields = Vec::new();
    while !parser.at_end().await {
        assert!(parser.parse().await.unwrap());
        let message = parser.message();
        fields.push((message.host.clone(), message.app.clone()));
        parser.skip_message().await;
    }
    (parser, fields)
}

const REPEATED: &[u8] = b"<1>1 - localhost myapp - - -\n\
<1>1 - localhost myapp - - -\n\
<1>1 - localhost myapp - - -\n";

#[tokio::test]
async fn repeated_host_and_app_skip_the_decoder() {
    let (cached, cached_fields) = run(REPEATED, ParserConfig::default()).await;
    let (uncached, uncached_fields) = run(REPEATED, ParserConfig::default().with_field_cache(false)).await;

    assert_eq!(cached_fields, uncached_fields);
    assert!(cached_fields
        .iter()
        .all(|f| f == &(Some("localhost".into()), Some("myapp".into()))));

    // "localhost" and "myapp" once; nil fields are never decoded.
    assert_eq!(cached.decoder().bytes_decoded(), 9 + 5);
    assert_eq!(uncached.decoder().bytes_decoded(), 3 * (9 + 5));
}

#[tokio::test]
async fn cache_tracks_changing_values() {
    let input = b"<1>1 - localhost app - - -\n\
<1>1 - localhostx app - - -\n\
<1>1 - local app - - -\n\
<1>1 - - app - - -\n\
<1>1 - local - - - -\n\
<1>1 - local app - - -\n";
    let (_, fields) = run(input, ParserConfig::default()).await;
    let hosts: Vec<Option<&str>> = fields.iter().map(|(h, _)| h.as_deref()).collect();
    let apps: Vec<Option<&str>> = fields.iter().map(|(_, a)| a.as_deref()).collect();
    assert_eq!(
        hosts,
        [Some("localhost"), Some("localhostx"), Some("local"), None, Some("local"), Some("local")]
    );
    assert_eq!(apps, [Some("app"), Some("app"), Some("app"), Some("app"), None, Some("app")]);
}

#[tokio::test]
async fn structured_data_names_are_interned() {
    let input = b"<1>1 - - - - - [origin@1 ip=\"1\" port=\"2\"]\n\
<1>1 - - - - - [origin@1 ip=\"3\" port=\"4\"]\n";
    let (parser, _) = run(input, ParserConfig::default()).await;
    // First message: "origin@1" "ip" "1" "port" "2"; second message only
    // the values.
    assert_eq!(parser.decoder().bytes_decoded(), (8 + 2 + 1 + 4 + 1) + (1 + 1));
}

#[tokio::test]
async fn disabled_interning_decodes_every_name() {
    let input = b"<1>1 - - - - - [origin@1 ip=\"1\"]\n\
<1>1 - - - - - [origin@1 ip=\"3\"]\n";
    let (parser, _) = run(input, ParserConfig::default().with_max_interned_keys(0)).await;
    assert_eq!(parser.decoder().bytes_decoded(), 2 * (8 + 2 + 1));
}

//! End-to-end parsing of known messages.
//!
//! Each test feeds bytes through the rendezvous channel into a fresh parser
//! and checks the resulting records field by field:
//!
//! - **RFC examples and the sample log**: every field of well-formed
//!   messages, including fractional seconds and zone offsets.
//! - **Minimal and invalid headers**: the all-nil message and headers that
//!   must be rejected.
//! - **Split multi-byte characters**: a value whose last character spans
//!   two chunks, decoded strictly and with a byte lost in transit.

use chrono::{DateTime, FixedOffset};
use syslog_parser::{ErrorAction, ParserConfig};
use syslog_tests::{Parsed, fixture, parse_chunks, parse_whole, split_at};
use syslog_types::{Facility, Severity};

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

// ── Well-formed messages ──────────────────────────────────────────────────────

#[tokio::test]
async fn full_header_with_structured_data() {
    let input = b"<123>1 2018-01-01T00:00:00Z localhost myapp 1 - [x@1 test=\"1\\\"2\"] msg1\n";
    let parsed = parse_whole(input, ParserConfig::default()).await.unwrap();
    assert_eq!(parsed.len(), 1);

    let message = parsed[0].message();
    assert_eq!(message.pri, 123);
    assert_eq!(message.facility(), Facility::Cron2);
    assert_eq!(message.facility().code(), Some(15));
    assert_eq!(message.severity(), Severity::Err);
    assert_eq!(message.severity().code(), Some(3));
    assert_eq!(message.timestamp, Some(ts("2018-01-01T00:00:00Z")));
    assert_eq!(message.host.as_deref(), Some("localhost"));
    assert_eq!(message.app.as_deref(), Some("myapp"));
    assert_eq!(message.proc_id, Some(1));
    assert_eq!(message.msg_id, None);
    assert_eq!(message.structured_data.get("x@1", "test"), Some("1\"2"));
    assert_eq!(parsed[0].body(), "msg1");
}

#[tokio::test]
async fn all_nil_header() {
    let parsed = parse_whole(b"<1>1 - - - - - -\n", ParserConfig::default()).await.unwrap();
    let message = parsed[0].message();
    assert_eq!(message.pri, 1);
    assert_eq!(message.timestamp, None);
    assert_eq!(message.host, None);
    assert_eq!(message.app, None);
    assert_eq!(message.proc_id, None);
    assert_eq!(message.msg_id, None);
    assert!(message.structured_data.is_empty());
    assert_eq!(parsed[0].body(), "");
}

#[tokio::test]
async fn rfc_examples() {
    let input = b"<34>1 2003-10-11T22:14:15.003Z mymachine.example.com su - ID47 - \xef\xbb\xbf'su root' failed for lonvick on /dev/pts/8\n\
<165>1 2003-08-24T05:14:15.000003-07:00 192.0.2.1 myproc 8710 - - %% It's time to make the do-nuts.\n\
<165>1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47 [exampleSDID@32473 iut=\"3\" eventSource=\"Application\" eventID=\"1011\"][examplePriority@32473 class=\"high\"]\n";
    let parsed = parse_whole(input, ParserConfig::default()).await.unwrap();
    assert_eq!(parsed.len(), 3);

    let first = parsed[0].message();
    assert_eq!(first.facility(), Facility::Auth);
    assert_eq!(first.severity(), Severity::Crit);
    assert_eq!(first.timestamp, Some(ts("2003-10-11T22:14:15.003Z")));
    assert_eq!(first.msg_id.as_deref(), Some("ID47"));
    assert_eq!(parsed[0].body(), "'su root' failed for lonvick on /dev/pts/8");

    let second = parsed[1].message();
    assert_eq!(second.facility(), Facility::Local4);
    assert_eq!(second.severity(), Severity::Notice);
    let ts2 = second.timestamp.unwrap();
    assert_eq!(ts2, ts("2003-08-24T05:14:15.000003-07:00"));
    assert_eq!(ts2.offset().local_minus_utc(), -7 * 3600);
    assert_eq!(second.host.as_deref(), Some("192.0.2.1"));
    assert_eq!(second.proc_id, Some(8710));

    let third = parsed[2].message();
    assert_eq!(third.structured_data.len(), 2);
    assert_eq!(third.structured_data.get("exampleSDID@32473", "eventSource"), Some("Application"));
    assert_eq!(third.structured_data.get("examplePriority@32473", "class"), Some("high"));
    assert_eq!(parsed[2].body(), "");
}

#[tokio::test]
async fn sample_log_renders() {
    let parsed = parse_whole(&fixture("sample.log"), ParserConfig::default()).await.unwrap();
    assert_eq!(parsed.len(), 4);
    assert!(parsed.iter().all(|p| p.message().host.as_deref() == Some("localhost")));

    let rendered: Vec<String> = parsed
        .iter()
        .map(|p| format!("{} {}", p.message(), p.body()))
        .collect();
    insta::assert_snapshot!(rendered.join("\n"), @r#"
    <34>1 2003-10-11T22:14:15.003Z localhost su - ID47 - msg1
    <165>1 2003-08-24T05:14:15.000003-07:00 localhost myproc 8710 - - msg02
    <165>1 2003-10-11T22:14:15.003Z localhost evntslog - ID47 [exampleSDID@32473 eventID="1011" eventSource="Application" iut="3"] msg003
    <123>1 2018-01-01T00:00:00Z localhost myapp 1 - [x@1 test="1\"2"][y@2 a="b" c="\\d"] msg0004
    "#);
}

// ── Rejected headers ──────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_pri_is_rejected() {
    let parsed = parse_whole(b"<>1 - - - - - -\n", ParserConfig::default()).await.unwrap();
    assert_eq!(parsed, vec![Parsed::Invalid]);
}

#[tokio::test]
async fn invalid_headers_are_rejected_and_skipped() {
    let cases: &[&[u8]] = &[
        b"34>1 - - - - - -\n",
        b"<34 1 - - - - - -\n",
        b"<34>2 - - - - - -\n",
        b"<34>1- - - - - -\n",
        b"<34>1 2003-13-11T22:14:15Z h a - - -\n",
        b"<34>1 2003-02-30T22:14:15Z h a - - -\n",
        b"<34>1 2003-10-11T22:14:15 h a - - -\n",
        b"<34>1 2003-10-11T22:14:15+01:60 h a - - -\n",
        b"<34>1 2003-10-11T22:14:15+24:00 h a - - -\n",
        b"<34>1 2003-10-11 h a - - -\n",
        b"<34>1 - h a 12x - -\n",
        b"<34>1 - h a - - \n",
        b"<34>1 - h a - - [\n",
        b"<34>1 - h a - - [id\n",
        b"<34>1 - h a - - [id k]\n",
        b"<34>1 - h a - - [id =v]\n",
    ];
    for case in cases {
        let mut input = case.to_vec();
        input.extend_from_slice(b"<1>1 - - - - - - ok\n");
        let parsed = parse_whole(&input, ParserConfig::default()).await.unwrap();
        assert_eq!(parsed.len(), 2, "{}", String::from_utf8_lossy(case));
        assert_eq!(parsed[0], Parsed::Invalid, "{}", String::from_utf8_lossy(case));
        assert_eq!(parsed[1].body(), "ok");
    }
}

// ── Split multi-byte characters ───────────────────────────────────────────────

const SPLIT_VALUE: &str = "<123>1 2018-01-01T00:00:00Z localhost myapp 1 - [x@1 test=1\u{1234}] msg1";

#[tokio::test]
async fn character_split_across_chunks() {
    let input = SPLIT_VALUE.as_bytes();
    let chunks = split_at(input, &[input.len() - 7]);
    let parsed = parse_chunks(chunks, ParserConfig::default()).await.unwrap();

    let message = parsed[0].message();
    assert_eq!(message.pri, 123);
    assert_eq!(message.timestamp, Some(ts("2018-01-01T00:00:00Z")));
    assert_eq!(message.app.as_deref(), Some("myapp"));
    assert_eq!(message.proc_id, Some(1));
    assert_eq!(message.msg_id, None);
    assert_eq!(message.structured_data.get("x@1", "test"), Some("1\u{1234}"));
    assert_eq!(parsed[0].body(), "msg1");
}

#[tokio::test]
async fn lost_byte_is_dropped_when_ignoring_malformed_input() {
    let input = SPLIT_VALUE.as_bytes();
    let mut damaged = input[..input.len() - 7].to_vec();
    damaged.extend_from_slice(&input[input.len() - 6..]);
    let chunks = split_at(&damaged, &[input.len() - 7]);

    let config = ParserConfig::default()
        .with_on_malformed(ErrorAction::Ignore)
        .with_on_unmappable(ErrorAction::Replace);
    let parsed = parse_chunks(chunks.clone(), config).await.unwrap();
    assert_eq!(parsed[0].message().host.as_deref(), Some("localhost"));
    assert_eq!(parsed[0].message().structured_data.get("x@1", "test"), Some("1"));

    let strict = parse_chunks(chunks, ParserConfig::default()).await.unwrap();
    assert_eq!(strict[0], Parsed::Invalid);
}

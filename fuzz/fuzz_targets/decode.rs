#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use syslog_decoder::{CharBuffer, ErrorAction, IncrementalDecoder};

#[derive(Arbitrary, Debug)]
struct Input {
    pieces: Vec<Vec<u8>>,
}

// Fuzz target: IncrementalDecoder fed arbitrary pieces.
//
// With the Replace policy, decoding piecewise must produce the same text
// as a lossy conversion of everything at once. Catches bugs in:
// - Partial sequences parked across pieces
// - Error lengths at piece boundaries
// - End-of-input handling of a trailing partial sequence
fuzz_target!(|input: Input| {
    let whole: Vec<u8> = input.pieces.concat();
    let mut decoder = IncrementalDecoder::default().with_on_malformed(ErrorAction::Replace);
    let mut dst = CharBuffer::with_capacity(whole.len().max(1));

    let count = input.pieces.len();
    for (i, piece) in input.pieces.iter().enumerate() {
        decoder.decode(piece, &mut dst, i + 1 == count).unwrap();
    }
    if count == 0 {
        decoder.flush(&mut dst).unwrap();
    }

    assert_eq!(dst.as_str(), String::from_utf8_lossy(&whole));
    assert!(decoder.pending().is_empty());
});

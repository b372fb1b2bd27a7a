#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use syslog_wire::GrowableBuffer;

#[derive(Arbitrary, Debug)]
enum Op {
    Write { position: u16, data: Vec<u8> },
    Read { position: u16, len: u16 },
    Truncate { size: u16 },
}

// Fuzz target: GrowableBuffer against a plain Vec<u8> model.
//
// Catches bugs in:
// - Block boundary arithmetic
// - Stale bytes surviving truncation
// - Sparse block reads
fuzz_target!(|ops: Vec<Op>| {
    let mut buffer = GrowableBuffer::new();
    let mut model: Vec<u8> = Vec::new();

    for op in ops {
        match op {
            Op::Write { position, data } => {
                let position = usize::from(position);
                let written = buffer.write_at(&data, position as u64);
                assert_eq!(written, data.len());
                let end = position + data.len();
                if model.len() < end {
                    model.resize(end, 0);
                }
                model[position..end].copy_from_slice(&data);
            }
            Op::Read { position, len } => {
                let position = usize::from(position);
                let mut out = vec![0xEEu8; usize::from(len)];
                match buffer.read_at(&mut out, position as u64) {
                    None => assert!(position >= model.len()),
                    Some(n) => {
                        assert_eq!(&out[..n], &model[position..position + n]);
                    }
                }
            }
            Op::Truncate { size } => {
                let size = usize::from(size).min(model.len());
                buffer.truncate(size as u64);
                model.truncate(size);
            }
        }
        assert_eq!(buffer.size(), model.len() as u64);
    }
});

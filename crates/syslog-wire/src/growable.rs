use std::io;

use crate::sink::ByteSink;

const BLOCK_SHIFT: u32 = 12;

/// Size of every block except a still-growing block 0.
pub const BLOCK_SIZE: usize = 1 << BLOCK_SHIFT;

const BLOCK_MASK: u64 = (BLOCK_SIZE as u64) - 1;

/// Allocation size of block 0 on first write. It doubles up to
/// [`BLOCK_SIZE`], so short tokens never pay for a full block.
const INITIAL_BLOCK: usize = 32;

/// Upper bound on the block table: 256 MiB of addressable bytes.
const MAX_BLOCKS: usize = 1 << 16;

/// A random-access byte store made of fixed-size blocks.
///
/// Used as scratch space when a token straddles chunk boundaries, and as a
/// general in-memory byte stream through its [`io::Read`], [`io::Write`]
/// and [`io::Seek`] impls.
///
/// ```text
///   position >> 12 ─┐        ┌─ position & 4095
///                   ▼        ▼
///   blocks: [ b0 | b1 | None | b3 ]      table length: always 2^k
///             │    │    │
///             │    │    └── sparse: reads as zeros
///             │    └─────── 4096 bytes
///             └──────────── 32..=4096 bytes, doubling on demand
/// ```
///
/// Invariants:
/// - the block table length is a power of two,
/// - `position <= size <= capacity()`,
/// - every byte at or beyond `size` is zero or unallocated, so growing
///   the buffer never resurfaces bytes from before a truncation.
#[derive(Clone)]
pub struct GrowableBuffer {
    blocks: Vec<Option<Box<[u8]>>>,
    position: u64,
    size: u64,
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowableBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: vec![None],
            position: 0,
            size: 0,
        }
    }

    /// Logical length in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cursor used by the sequential [`read`](Self::read) and
    /// [`write`](Self::write).
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the cursor. Positions past `size` extend the buffer with zeros.
    pub fn set_position(&mut self, position: u64) {
        if position > self.size {
            self.truncate(position);
        }
        self.position = position.min(self.size);
    }

    /// Bytes addressable without growing the block table.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        (self.blocks.len() as u64) << BLOCK_SHIFT
    }

    /// Length of the block table.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn max_capacity() -> u64 {
        (MAX_BLOCKS as u64) << BLOCK_SHIFT
    }

    // ── Positional access ───────────────────────────────────────────────

    /// Copy bytes starting at `position` into `dst` without moving the
    /// cursor.
    ///
    /// Returns `None` when `position` is at or beyond `size`, otherwise the
    /// number of bytes copied (bounded by `dst.len()` and `size`).
    pub fn read_at(&self, dst: &mut [u8], position: u64) -> Option<usize> {
        if position >= self.size {
            return None;
        }
        let n = usize::try_from(self.size - position).map_or(dst.len(), |left| left.min(dst.len()));

        let mut done = 0;
        while done < n {
            let at = position + done as u64;
            let (index, offset) = split(at);
            let len = (BLOCK_SIZE - offset).min(n - done);
            let out = &mut dst[done..done + len];
            match self.blocks.get(index).and_then(Option::as_deref) {
                Some(block) if offset < block.len() => {
                    let have = (block.len() - offset).min(len);
                    out[..have].copy_from_slice(&block[offset..offset + have]);
                    out[have..].fill(0);
                }
                _ => out.fill(0),
            }
            done += len;
        }
        Some(n)
    }

    /// Copy `src` into the buffer at `position` without moving the cursor.
    ///
    /// Extends `size` when the write ends past it. Returns the number of
    /// bytes written, which is short only at the maximum capacity.
    pub fn write_at(&mut self, src: &[u8], position: u64) -> usize {
        let limit = Self::max_capacity();
        if position >= limit {
            return 0;
        }
        let n = usize::try_from(limit - position).map_or(src.len(), |room| room.min(src.len()));
        if n == 0 {
            return 0;
        }
        let end = position + n as u64;
        self.ensure_table(end);

        let mut done = 0;
        while done < n {
            let at = position + done as u64;
            let (index, offset) = split(at);
            let len = (BLOCK_SIZE - offset).min(n - done);
            let block = self.block_mut(index, offset + len);
            block[offset..offset + len].copy_from_slice(&src[done..done + len]);
            done += len;
        }
        self.size = self.size.max(end);
        n
    }

    /// The byte at `position`, or `None` at or beyond `size`.
    #[must_use]
    pub fn get(&self, position: u64) -> Option<u8> {
        let mut byte = [0u8];
        self.read_at(&mut byte, position).map(|_| byte[0])
    }

    /// Store one byte at `position`. Returns `false` past the maximum
    /// capacity.
    pub fn set(&mut self, position: u64, byte: u8) -> bool {
        self.write_at(&[byte], position) == 1
    }

    // ── Sequential access ───────────────────────────────────────────────

    /// Read at the cursor and advance it. Returns 0 at the end.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = self.read_at(dst, self.position).unwrap_or(0);
        self.position += n as u64;
        n
    }

    /// Write at the cursor and advance it.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let n = self.write_at(src, self.position);
        self.position += n as u64;
        n
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        let byte = self.get(self.position)?;
        self.position += 1;
        Some(byte)
    }

    pub fn write_byte(&mut self, byte: u8) -> bool {
        self.write(&[byte]) == 1
    }

    // ── Resizing ────────────────────────────────────────────────────────

    /// Set the logical size.
    ///
    /// Shrinking drops whole blocks past the new end, zeroes the tail of
    /// the last kept block, and halves the block table while the smaller
    /// table still addresses `new_size`. Growing exposes zeros.
    pub fn truncate(&mut self, new_size: u64) {
        let new_size = new_size.min(Self::max_capacity());
        if new_size < self.size {
            let keep = blocks_for(new_size);
            let (index, offset) = split(new_size);
            if offset != 0 {
                if let Some(block) = self.blocks[index].as_deref_mut() {
                    if offset < block.len() {
                        block[offset..].fill(0);
                    }
                }
            }
            for slot in &mut self.blocks[keep..] {
                *slot = None;
            }
            let mut len = self.blocks.len();
            while len > 1 && len / 2 >= keep {
                len /= 2;
            }
            self.blocks.truncate(len);
        } else {
            self.ensure_table(new_size);
        }
        self.size = new_size;
        self.position = self.position.min(new_size);
    }

    /// Drop all content and rewind. Same as `truncate(0)`.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    // ── Copying out ─────────────────────────────────────────────────────

    /// The whole content as one slice, when it still fits in block 0.
    #[must_use]
    pub fn as_contiguous(&self) -> Option<&[u8]> {
        let size = usize::try_from(self.size).ok()?;
        if size == 0 {
            return Some(&[]);
        }
        match self.blocks[0].as_deref() {
            Some(block) if size <= block.len() => Some(&block[..size]),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        if let Some(bytes) = self.as_contiguous() {
            return bytes.to_vec();
        }
        let len = usize::try_from(self.size).unwrap_or(usize::MAX);
        let mut out = vec![0u8; len];
        let _ = self.read_at(&mut out, 0);
        out
    }

    /// The content as text, with invalid UTF-8 replaced by U+FFFD.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_vec()).into_owned()
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Grow the block table (by doubling) until it addresses `end` bytes.
    fn ensure_table(&mut self, end: u64) {
        let needed = blocks_for(end).max(1);
        if needed > self.blocks.len() {
            self.blocks.resize(needed.next_power_of_two(), None);
        }
    }

    /// Block `index`, allocated and at least `need` bytes long.
    fn block_mut(&mut self, index: usize, need: usize) -> &mut [u8] {
        let block = self.blocks[index].get_or_insert_with(Box::default);
        if block.len() < need {
            let len = if index == 0 {
                need.next_power_of_two().clamp(INITIAL_BLOCK, BLOCK_SIZE)
            } else {
                BLOCK_SIZE
            };
            let mut grown = vec![0u8; len].into_boxed_slice();
            grown[..block.len()].copy_from_slice(block);
            *block = grown;
        }
        block
    }
}

/// Block index and in-block offset of `position`.
#[allow(clippy::cast_possible_truncation)]
fn split(position: u64) -> (usize, usize) {
    ((position >> BLOCK_SHIFT) as usize, (position & BLOCK_MASK) as usize)
}

/// Number of blocks needed to hold `size` bytes.
#[allow(clippy::cast_possible_truncation)]
fn blocks_for(size: u64) -> usize {
    size.div_ceil(BLOCK_SIZE as u64) as usize
}

impl std::fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("size", &self.size)
            .field("position", &self.position)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

impl ByteSink for GrowableBuffer {
    fn remaining(&self) -> usize {
        usize::try_from(Self::max_capacity() - self.position).unwrap_or(usize::MAX)
    }

    fn put(&mut self, bytes: &[u8]) {
        self.write(bytes);
    }
}

impl io::Read for GrowableBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(GrowableBuffer::read(self, buf))
    }
}

impl io::Write for GrowableBuffer {
    /// A short (or zero) count means the maximum capacity was reached;
    /// `write_all` turns that into [`io::ErrorKind::WriteZero`].
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(GrowableBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for GrowableBuffer {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(n) => Some(n),
            io::SeekFrom::End(delta) => self.size.checked_add_signed(delta),
            io::SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ));
        };
        self.set_position(target);
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom, Write};

    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn positional_read_spans_block_boundary() {
        let data = pattern(5000);
        let mut buf = GrowableBuffer::new();
        assert_eq!(buf.write(&data), 5000);
        assert_eq!(buf.size(), 5000);
        assert_eq!(buf.position(), 5000);

        let mut out = [0u8; 100];
        assert_eq!(buf.read_at(&mut out, 4000), Some(100));
        assert_eq!(&out[..], &data[4000..4100]);
        assert_eq!(buf.position(), 5000, "positional read moved the cursor");
    }

    #[test]
    fn truncate_never_resurfaces_stale_bytes() {
        let mut buf = GrowableBuffer::new();
        buf.write(&[0xAA; 10_000]);
        buf.truncate(0);
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.position(), 0);

        buf.write(b"new");
        assert_eq!(buf.get(5000), None);
        assert_eq!(buf.get(10), None);

        buf.write_at(b"!", 6000);
        let mut gap = vec![0xFFu8; 5997];
        assert_eq!(buf.read_at(&mut gap, 3), Some(5997));
        assert!(gap.iter().all(|&b| b == 0));
        assert_eq!(buf.get(6000), Some(b'!'));
    }

    #[test]
    fn shrinking_within_a_block_zeroes_its_tail() {
        let mut buf = GrowableBuffer::new();
        buf.write(b"abcdef");
        buf.truncate(2);
        buf.truncate(6);
        assert_eq!(buf.to_vec(), b"ab\0\0\0\0");
    }

    #[test]
    fn block_table_stays_power_of_two() {
        let mut buf = GrowableBuffer::new();
        assert_eq!(buf.block_count(), 1);
        buf.write_at(b"x", 5 * BLOCK_SIZE as u64);
        assert_eq!(buf.block_count(), 8);

        buf.truncate(BLOCK_SIZE as u64 + 1);
        assert_eq!(buf.block_count(), 2);
        assert_eq!(buf.capacity(), 2 * BLOCK_SIZE as u64);

        buf.truncate(0);
        assert_eq!(buf.block_count(), 1);
    }

    #[test]
    fn sparse_blocks_read_as_zero() {
        let mut buf = GrowableBuffer::new();
        buf.set(3 * BLOCK_SIZE as u64, 7);
        assert_eq!(buf.get(BLOCK_SIZE as u64 + 17), Some(0));
        assert_eq!(buf.get(3 * BLOCK_SIZE as u64), Some(7));
        assert_eq!(buf.get(3 * BLOCK_SIZE as u64 + 1), None);
    }

    fn first_block_len(buf: &GrowableBuffer) -> Option<usize> {
        buf.blocks[0].as_ref().map(|block| block.len())
    }

    #[test]
    fn first_block_doubles_from_32_bytes() {
        let mut buf = GrowableBuffer::new();
        assert_eq!(first_block_len(&buf), None);

        buf.write(&[1]);
        assert_eq!(first_block_len(&buf), Some(INITIAL_BLOCK));
        buf.write(&pattern(32));
        assert_eq!(first_block_len(&buf), Some(64));
        buf.write(&pattern(2049 - 33));
        assert_eq!(first_block_len(&buf), Some(4096));
        assert_eq!(buf.block_count(), 1);

        for (len, expected) in [(1, 32), (33, 64), (2049, 4096)] {
            let mut fresh = GrowableBuffer::new();
            fresh.write(&pattern(len));
            assert_eq!(first_block_len(&fresh), Some(expected), "{len} bytes");
            assert_eq!(fresh.to_vec(), pattern(len));
        }
    }

    #[test]
    fn small_content_stays_contiguous() {
        let mut buf = GrowableBuffer::new();
        assert_eq!(buf.as_contiguous(), Some(&b""[..]));
        buf.write(b"localhost");
        assert_eq!(buf.as_contiguous(), Some(&b"localhost"[..]));
        assert_eq!(buf.to_string_lossy(), "localhost");

        buf.write(&pattern(BLOCK_SIZE));
        assert_eq!(buf.as_contiguous(), None);
        assert_eq!(buf.to_vec().len(), BLOCK_SIZE + 9);
    }

    #[test]
    fn io_traits_round_trip() {
        let mut buf = GrowableBuffer::new();
        buf.write_all(b"hello, world").unwrap();
        assert_eq!(buf.seek(SeekFrom::End(-5)).unwrap(), 7);

        let mut tail = String::new();
        buf.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "world");

        buf.seek(SeekFrom::Start(0)).unwrap();
        let mut head = [0u8; 5];
        buf.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"hello");

        assert!(buf.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn seeking_past_end_extends_with_zeros() {
        let mut buf = GrowableBuffer::new();
        buf.write(b"ab");
        buf.seek(SeekFrom::Start(4)).unwrap();
        buf.write(b"c");
        assert_eq!(buf.to_vec(), b"ab\0\0c");
    }

    #[test]
    fn byte_at_a_time() {
        let mut buf = GrowableBuffer::new();
        assert!(buf.write_byte(b'x'));
        assert!(buf.write_byte(b'y'));
        buf.set_position(0);
        assert_eq!(buf.read_byte(), Some(b'x'));
        assert_eq!(buf.read_byte(), Some(b'y'));
        assert_eq!(buf.read_byte(), None);
    }
}

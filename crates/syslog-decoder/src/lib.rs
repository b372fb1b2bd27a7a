#![warn(clippy::pedantic)]

pub mod char_buffer;
pub mod decoder;
pub mod engine;
pub mod error;

pub use char_buffer::CharBuffer;
pub use decoder::{Decoded, IncrementalDecoder, SCRATCH_CAPACITY};
pub use engine::{CoderResult, DecodeEngine, ErrorAction, Utf8Engine};
pub use error::DecodeError;

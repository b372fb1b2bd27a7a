#![warn(clippy::pedantic)]

pub mod byte_class;
pub mod channel;
pub mod error;
pub mod growable;
pub mod scanner;
pub mod sink;

pub use byte_class::{BytePredicate, ByteClass};
pub use channel::{ChunkReceiver, ChunkSender, rendezvous};
pub use error::WireError;
pub use growable::GrowableBuffer;
pub use scanner::{Accumulator, Scanner, Until};
pub use sink::{ByteSink, FixedSink, Limited};

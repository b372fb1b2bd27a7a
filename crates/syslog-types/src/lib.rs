#![warn(clippy::pedantic)]

pub mod enums;
pub mod message;
pub mod structured_data;
pub mod timestamp;

pub use enums::{Facility, Severity};
pub use message::Message;
pub use structured_data::StructuredData;
pub use timestamp::TimestampParts;

#![warn(clippy::pedantic)]

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod parser;

pub use config::ParserConfig;
pub use error::{FeedError, ParseError};
pub use feed::feed;
pub use parser::SyslogParser;
pub use syslog_decoder::ErrorAction;

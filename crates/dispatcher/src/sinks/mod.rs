//! Sink implementations
//!
//! Contains LogSink, FileSink and AudioSink.

mod audio;
mod file;
mod log;

pub use self::audio::{AudioSink, LoggingPlayer, SoundPlayer};
pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;

//! 具体源适配器

pub(crate) mod common;
mod frames;
mod speech;

pub use frames::FrameAdapter;
pub use speech::SpeechAdapter;

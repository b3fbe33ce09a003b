//! # Ingestion Pipeline
//!
//! Sensor event ingestion module.
//!
//! Responsibilities:
//! - Register frame and speech sources
//! - Wrap callback data into `SensorEvent`
//! - Backpressure management and drop policy
//! - Send to downstream via async-channel (bounded frame lane, unbounded speech lane)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, IngestionPipeline};
//!
//! let mut pipeline = IngestionPipeline::with_config(BackpressureConfig::from(&blueprint.ingestion));
//! pipeline.register_frame_source(rig.frame_source())?;
//! if let Some(speech) = rig.speech_source() {
//!     pipeline.register_speech_source(speech)?;
//! }
//!
//! let rx = pipeline.take_receiver().unwrap();
//! pipeline.start_all()?;
//! while let Ok(event) = rx.recv().await {
//!     // Feed the duel engine
//! }
//! ```

mod adapter;
mod adapters;
mod config;
mod error;
mod mock;
mod pipeline;
mod receiver;

// Re-exports
pub use adapter::{SourceAdapter, StreamKind};
pub use adapters::common::{send_event, SendOutcome};
pub use adapters::{FrameAdapter, SpeechAdapter};
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::SensorEvent;
pub use error::{IngestionError, Result};
pub use mock::{MockFrameSource, MockSpeechSource, StartLog};
pub use pipeline::IngestionPipeline;
pub use receiver::EventReceiver;

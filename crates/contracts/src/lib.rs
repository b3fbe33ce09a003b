//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the duel workspace:
//! sensor frames, skeletons, speech results, the per-frame duel output and
//! the traits that sit between the sensor backends, the engine and the sinks.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the sensor frame timestamp (seconds, f64) as the game clock
//! - `frame_number` is informational, used for ordering/diagnostics
//!
//! ## Coordinate Spaces
//! - [`SkeletonPoint`]: sensor space, meters
//! - [`ColorPoint`]: color image pixels, integer
//! - [`DisplayPoint`]: display surface, color pixels times the display scale

mod blueprint;
mod duel;
mod duel_engine_config;
mod error;
mod frame;
mod sink;
mod skeleton;
mod source;
mod speech;

pub use blueprint::*;
pub use duel::*;
pub use duel_engine_config::*;
pub use error::*;
pub use frame::*;
pub use sink::*;
pub use skeleton::*;
pub use source::{CoordinateMapper, FrameCallback, FrameSource, SpeechCallback, SpeechSource};
pub use speech::*;

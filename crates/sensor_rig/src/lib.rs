//! # Sensor Rig
//!
//! Sensor backends for the duel.
//!
//! Responsibilities:
//! - Open the color + skeleton stream from `GameBlueprint` (format, smoothing)
//! - Provide unified `FrameSource` / `SpeechSource` implementations
//! - Select a speech recognizer for the configured culture
//! - Support Mock (synthetic duel) and Replay (JSONL recording) modes

pub mod choreography;
pub mod error;
pub mod mock_sensor;
pub mod recognizer;
pub mod replay_sensor;
pub mod rig;
pub mod scripted_speech;
pub mod smoothing;

pub use choreography::DuelChoreography;
pub use contracts::{FrameSource, GameBlueprint, SpeechSource};
pub use error::{Result, RigError};
pub use mock_sensor::{Bgr32, MockSensor};
pub use recognizer::{select_recognizer, Grammar};
pub use replay_sensor::{Recording, ReplaySensor};
pub use rig::{RigSummary, SensorRig, FRAME_SOURCE_ID, SPEECH_SOURCE_ID};
pub use scripted_speech::ScriptedSpeech;
pub use smoothing::JointSmoother;

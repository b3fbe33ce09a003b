//! Duel engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

use crate::ColorImageFormat;

/// Default blade length in display pixels
pub const DEFAULT_BLADE_LENGTH: f64 = 350.0;
/// Default grip offset (degrees), applied +/- by handedness
pub const DEFAULT_GRIP_OFFSET_DEG: f64 = 45.0;
/// Display surface scale relative to the color resolution
pub const DEFAULT_DISPLAY_SCALE: f64 = 2.0;
/// Motion history capacity per saber
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
/// Horizontal tip displacement that triggers a swing (display pixels)
pub const DEFAULT_SWING_THRESHOLD: f64 = 100.0;
/// Strength at round start
pub const DEFAULT_STARTING_STRENGTH: i32 = 5;
/// Minimum time between two hits on the same player (seconds)
pub const DEFAULT_HIT_COOLDOWN_S: f64 = 1.0;
/// Minimum speech confidence for a command to count
pub const DEFAULT_SPEECH_CONFIDENCE: f32 = 0.4;
/// Status message once the sensor is running
pub const DEFAULT_CONNECTED_MESSAGE: &str = "Kinect connected";

/// Duel engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelEngineConfig {
    /// Color stream format used for coordinate mapping
    pub color_format: ColorImageFormat,

    /// Blade length (display pixels)
    pub blade_length: f64,

    /// Grip offset magnitude (degrees)
    pub grip_offset_deg: f64,

    /// Display scale relative to color pixels
    pub display_scale: f64,

    /// Motion history capacity
    pub history_capacity: usize,

    /// Swing trigger threshold (display pixels)
    pub swing_threshold: f64,

    /// Strength at round start
    pub starting_strength: i32,

    /// Hit cooldown (seconds)
    pub hit_cooldown_s: f64,

    /// Speech command handling
    #[serde(default)]
    pub speech: SpeechCommandConfig,

    /// How tracked skeletons map onto player slots
    #[serde(default)]
    pub player_assignment: PlayerAssignment,

    /// Message shown once the sensor started
    pub connected_message: String,
}

impl Default for DuelEngineConfig {
    fn default() -> Self {
        Self {
            color_format: ColorImageFormat::default(),
            blade_length: DEFAULT_BLADE_LENGTH,
            grip_offset_deg: DEFAULT_GRIP_OFFSET_DEG,
            display_scale: DEFAULT_DISPLAY_SCALE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            swing_threshold: DEFAULT_SWING_THRESHOLD,
            starting_strength: DEFAULT_STARTING_STRENGTH,
            hit_cooldown_s: DEFAULT_HIT_COOLDOWN_S,
            speech: SpeechCommandConfig::default(),
            player_assignment: PlayerAssignment::default(),
            connected_message: DEFAULT_CONNECTED_MESSAGE.to_string(),
        }
    }
}

/// Voice command words and acceptance threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechCommandConfig {
    /// Minimum confidence (inclusive)
    pub confidence_threshold: f32,

    /// Word enabling hulk mode
    pub hulk_word: String,

    /// Word turning the status message red
    pub smash_word: String,
}

impl Default for SpeechCommandConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_SPEECH_CONFIDENCE,
            hulk_word: "hulk".to_string(),
            smash_word: "smash".to_string(),
        }
    }
}

/// Strategy for assigning tracked skeletons to player slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAssignment {
    /// First two tracked skeletons in array order
    #[default]
    Positional,
    /// Keep players bound to their sensor tracking id while they stay tracked
    TrackingId,
}

//! Speech recognition contracts

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recognized phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResult {
    /// Recognized text as reported by the engine (case not normalized)
    pub text: String,

    /// Engine confidence in [0, 1]
    pub confidence: f32,

    /// Sensor clock when the phrase was recognized (seconds)
    #[serde(default)]
    pub timestamp: f64,
}

/// Description of an installed speech recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerInfo {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Culture tag, e.g. `en-US`
    pub culture: String,

    /// Engine-specific key/value metadata
    #[serde(default)]
    pub additional_info: HashMap<String, String>,
}

impl RecognizerInfo {
    /// Metadata key advertising sensor microphone array support
    pub const SENSOR_AUDIO_KEY: &'static str = "Kinect";

    /// Whether the recognizer advertises sensor audio support (`Kinect = True`)
    pub fn supports_sensor_audio(&self) -> bool {
        self.additional_info
            .get(Self::SENSOR_AUDIO_KEY)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    /// Default recognizer the scripted speech backend reports
    pub fn sensor_default(culture: impl Into<String>) -> Self {
        let culture = culture.into();
        Self {
            id: format!("SR_MS_{culture}_KINECT_11.0"),
            name: format!("Microsoft Server Speech Recognition Language - Kinect ({culture})"),
            culture,
            additional_info: HashMap::from([(
                Self::SENSOR_AUDIO_KEY.to_string(),
                "True".to_string(),
            )]),
        }
    }
}

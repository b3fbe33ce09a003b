//! Speech recognizer selection and command grammar

use contracts::RecognizerInfo;
use tracing::{debug, info};

use crate::error::{Result, RigError};

/// Closed-vocabulary grammar bound to one culture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    culture: String,
    phrases: Vec<String>,
}

impl Grammar {
    pub fn new(
        culture: impl Into<String>,
        phrases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            culture: culture.into(),
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn culture(&self) -> &str {
        &self.culture
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Case-insensitive phrase match
    pub fn matches(&self, text: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| phrase.eq_ignore_ascii_case(text.trim()))
    }
}

/// Pick the first installed recognizer for `culture`
///
/// With `require_sensor_audio`, only recognizers advertising `Kinect = True`
/// qualify. Culture comparison ignores case.
pub fn select_recognizer(
    installed: &[RecognizerInfo],
    culture: &str,
    require_sensor_audio: bool,
) -> Result<RecognizerInfo> {
    debug!(
        installed = installed.len(),
        culture,
        require_sensor_audio,
        "selecting speech recognizer"
    );

    let selected = installed
        .iter()
        .filter(|info| !require_sensor_audio || info.supports_sensor_audio())
        .find(|info| info.culture.eq_ignore_ascii_case(culture))
        .cloned()
        .ok_or_else(|| RigError::NoRecognizer {
            culture: culture.to_string(),
        })?;

    info!(recognizer = %selected.id, culture = %selected.culture, "speech recognizer selected");
    Ok(selected)
}

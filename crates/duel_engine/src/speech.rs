//! Voice command interpretation.

use contracts::{SpeechCommandConfig, SpeechResult};

/// Recognized duel command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Turn hulk mode on
    Hulk,
    /// Paint the status message red
    Smash,
}

impl VoiceCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceCommand::Hulk => "hulk",
            VoiceCommand::Smash => "smash",
        }
    }
}

/// Maps recognition results onto commands
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    config: SpeechCommandConfig,
}

impl CommandInterpreter {
    pub fn new(config: SpeechCommandConfig) -> Self {
        Self { config }
    }

    /// `None` below the confidence threshold or for words outside the vocabulary
    pub fn interpret(&self, result: &SpeechResult) -> Option<VoiceCommand> {
        if result.confidence < self.config.confidence_threshold {
            return None;
        }

        let text = result.text.trim();
        if text.eq_ignore_ascii_case(&self.config.hulk_word) {
            Some(VoiceCommand::Hulk)
        } else if text.eq_ignore_ascii_case(&self.config.smash_word) {
            Some(VoiceCommand::Smash)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heard(text: &str, confidence: f32) -> SpeechResult {
        SpeechResult {
            text: text.into(),
            confidence,
            timestamp: 0.0,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let interpreter = CommandInterpreter::new(SpeechCommandConfig::default());
        assert_eq!(interpreter.interpret(&heard("hulk", 0.4)), Some(VoiceCommand::Hulk));
        assert_eq!(interpreter.interpret(&heard("hulk", 0.39)), None);
    }

    #[test]
    fn words_match_case_insensitively() {
        let interpreter = CommandInterpreter::new(SpeechCommandConfig::default());
        assert_eq!(interpreter.interpret(&heard("HULK", 0.6)), Some(VoiceCommand::Hulk));
        assert_eq!(interpreter.interpret(&heard("Smash", 0.9)), Some(VoiceCommand::Smash));
        assert_eq!(interpreter.interpret(&heard("lightsaber", 0.9)), None);
    }
}

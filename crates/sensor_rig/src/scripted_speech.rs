//! Scripted speech source
//!
//! Implements `SpeechSource` by replaying a list of utterances at fixed offsets
//! from `listen`. Out-of-grammar utterances are rejected like a grammar engine would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use contracts::{RecognizerInfo, ScriptedUtterance, SpeechCallback, SpeechResult, SpeechSource};
use tracing::{debug, trace};

use crate::recognizer::Grammar;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Scripted speech recognizer
pub struct ScriptedSpeech {
    source_id: String,
    recognizer: RecognizerInfo,
    grammar: Grammar,
    script: Vec<ScriptedUtterance>,
    listening: Arc<AtomicBool>,
}

impl ScriptedSpeech {
    pub fn new(
        source_id: impl Into<String>,
        recognizer: RecognizerInfo,
        grammar: Grammar,
        mut script: Vec<ScriptedUtterance>,
    ) -> Self {
        script.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        Self {
            source_id: source_id.into(),
            recognizer,
            grammar,
            script,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

impl SpeechSource for ScriptedSpeech {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn recognizer(&self) -> &RecognizerInfo {
        &self.recognizer
    }

    fn listen(&self, callback: SpeechCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let grammar = self.grammar.clone();
        let script = self.script.clone();
        let listening = self.listening.clone();

        thread::spawn(move || {
            let start = Instant::now();
            debug!(source_id = %source_id, utterances = script.len(), "speech script started");

            for utterance in script {
                let due = Duration::from_secs_f64(utterance.at_s.max(0.0));
                // sleep in short slices so stop() is honored promptly
                while start.elapsed() < due {
                    if !listening.load(Ordering::Relaxed) {
                        debug!(source_id = %source_id, "speech script stopped");
                        return;
                    }
                    thread::sleep(POLL_INTERVAL.min(due.saturating_sub(start.elapsed())));
                }
                if !listening.load(Ordering::Relaxed) {
                    return;
                }

                if !grammar.matches(&utterance.text) {
                    debug!(
                        source_id = %source_id,
                        text = %utterance.text,
                        "speech rejected by grammar"
                    );
                    continue;
                }

                trace!(
                    source_id = %source_id,
                    text = %utterance.text,
                    confidence = utterance.confidence,
                    "speech recognized"
                );
                callback(SpeechResult {
                    text: utterance.text,
                    confidence: utterance.confidence,
                    timestamp: utterance.at_s,
                });
            }

            debug!(source_id = %source_id, "speech script finished");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

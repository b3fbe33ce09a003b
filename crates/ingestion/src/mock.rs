//! Mock 事件源
//!
//! 用于无传感器环境的测试：按固定间隔逐个回放预置的帧/语音事件。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{
    AllFramesReady, ColorImageFormat, FrameCallback, FrameSource, RecognizerInfo, SpeechCallback,
    SpeechResult, SpeechSource,
};
use tracing::debug;

/// 记录 `listen` 调用顺序的共享日志
pub type StartLog = Arc<Mutex<Vec<String>>>;

fn note_start(log: &Option<StartLog>, source_id: &str) {
    if let Some(log) = log {
        if let Ok(mut entries) = log.lock() {
            entries.push(source_id.to_string());
        }
    }
}

/// Mock 帧源
pub struct MockFrameSource {
    source_id: String,
    format: ColorImageFormat,
    frames: Vec<AllFramesReady>,
    interval: Duration,
    start_log: Option<StartLog>,
    listening: Arc<AtomicBool>,
}

impl MockFrameSource {
    pub fn new(
        source_id: impl Into<String>,
        format: ColorImageFormat,
        frames: Vec<AllFramesReady>,
        interval: Duration,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            format,
            frames,
            interval,
            start_log: None,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 在 `listen` 时写入启动日志
    pub fn with_start_log(mut self, log: StartLog) -> Self {
        self.start_log = Some(log);
        self
    }
}

impl FrameSource for MockFrameSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn color_format(&self) -> ColorImageFormat {
        self.format
    }

    fn listen(&self, callback: FrameCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        note_start(&self.start_log, &self.source_id);

        let frames = self.frames.clone();
        let interval = self.interval;
        let listening = self.listening.clone();
        let source_id = self.source_id.clone();

        thread::spawn(move || {
            for frame in frames {
                if !listening.load(Ordering::Relaxed) {
                    break;
                }
                callback(frame);
                thread::sleep(interval);
            }
            debug!(source_id = %source_id, "mock frame source exhausted");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

/// Mock 语音源
pub struct MockSpeechSource {
    source_id: String,
    recognizer: RecognizerInfo,
    results: Vec<SpeechResult>,
    interval: Duration,
    start_log: Option<StartLog>,
    listening: Arc<AtomicBool>,
}

impl MockSpeechSource {
    pub fn new(
        source_id: impl Into<String>,
        results: Vec<SpeechResult>,
        interval: Duration,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            recognizer: RecognizerInfo::sensor_default("en-US"),
            results,
            interval,
            start_log: None,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 在 `listen` 时写入启动日志
    pub fn with_start_log(mut self, log: StartLog) -> Self {
        self.start_log = Some(log);
        self
    }
}

impl SpeechSource for MockSpeechSource {
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
        note_start(&self.start_log, &self.source_id);

        let results = self.results.clone();
        let interval = self.interval;
        let listening = self.listening.clone();

        thread::spawn(move || {
            for result in results {
                thread::sleep(interval);
                if !listening.load(Ordering::Relaxed) {
                    break;
                }
                callback(result);
            }
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

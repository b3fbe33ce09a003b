//! Replay Sensor - 从录制文件回放传感器数据
//!
//! 读取 JSONL 录制文件 (每行一个 `SensorEvent`)，
//! 按原始时间戳回放帧数据；语音行交给脚本语音源回放。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{
    AllFramesReady, ColorImageFormat, FrameCallback, FrameSource, ReplayConfig,
    ScriptedUtterance, SensorEvent, SmoothingParameters,
};
use tracing::{debug, info, warn};

use crate::error::{Result, RigError};
use crate::smoothing::JointSmoother;

/// 已解析的录制文件
#[derive(Debug, Clone, Default)]
pub struct Recording {
    /// 帧事件，按时间戳排序
    pub frames: Vec<AllFramesReady>,

    /// 语音事件，转换为相对首帧的脚本
    pub utterances: Vec<ScriptedUtterance>,
}

impl Recording {
    /// 读取 JSONL 录制文件
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| RigError::recording_load(&display, e.to_string()))?;
        let reader = BufReader::new(file);

        let mut frames = Vec::new();
        let mut speech = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| RigError::recording_load(&display, e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }

            let event: SensorEvent = serde_json::from_str(&line).map_err(|e| {
                RigError::recording_load(&display, format!("line {}: {e}", line_no + 1))
            })?;

            match event {
                SensorEvent::Frames(ready) => frames.push(ready),
                SensorEvent::Speech(result) => speech.push(result),
            }
        }

        // 按时间戳排序
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        speech.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let origin = frames.first().map(|f| f.timestamp).unwrap_or(0.0);
        let utterances = speech
            .into_iter()
            .map(|result| ScriptedUtterance {
                at_s: (result.timestamp - origin).max(0.0),
                text: result.text,
                confidence: result.confidence,
            })
            .collect();

        Ok(Self { frames, utterances })
    }

    /// 首个彩色帧的格式
    pub fn color_format(&self) -> Option<ColorImageFormat> {
        self.frames
            .iter()
            .find_map(|frames| frames.color.as_ref().map(|color| color.format))
    }
}

/// Replay Sensor - 从录制文件回放帧数据
pub struct ReplaySensor {
    source_id: String,
    path: PathBuf,
    recording: Arc<Recording>,
    color_format: ColorImageFormat,
    smoothing: SmoothingParameters,
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySensor {
    /// 从录制文件加载传感器
    pub fn load(
        source_id: impl Into<String>,
        config: ReplayConfig,
        fallback_format: ColorImageFormat,
        smoothing: SmoothingParameters,
    ) -> Result<Self> {
        let source_id = source_id.into();
        let recording = Recording::load(&config.path)?;
        let color_format = recording.color_format().unwrap_or(fallback_format);

        info!(
            source_id = %source_id,
            path = %config.path.display(),
            frames = recording.frames.len(),
            utterances = recording.utterances.len(),
            "Loaded replay sensor"
        );

        Ok(Self {
            source_id,
            path: config.path.clone(),
            recording: Arc::new(recording),
            color_format,
            smoothing,
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    /// 录制中的语音脚本
    pub fn utterances(&self) -> &[ScriptedUtterance] {
        &self.recording.utterances
    }

    /// 录制帧数
    pub fn frame_count(&self) -> usize {
        self.recording.frames.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ReplaySensor {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn color_format(&self) -> ColorImageFormat {
        self.color_format
    }

    fn listen(&self, callback: FrameCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let source_id = self.source_id.clone();
        let recording = self.recording.clone();
        let smoothing = self.smoothing;
        let speed = self.config.speed.max(0.1);
        let loop_playback = self.config.loop_playback;

        let handle = thread::spawn(move || {
            debug!(source_id = %source_id, "Replay thread started");
            let mut smoother = JointSmoother::new(smoothing);
            // 循环回放时时间戳持续递增
            let mut loop_offset = 0.0;

            'playback: loop {
                let (Some(first), Some(last)) = (recording.frames.first(), recording.frames.last())
                else {
                    warn!(source_id = %source_id, "No frames to replay");
                    break;
                };

                let start_time = Instant::now();
                let first_timestamp = first.timestamp;

                for recorded in &recording.frames {
                    if !listening.load(Ordering::Relaxed) {
                        debug!(source_id = %source_id, "Replay stopped");
                        break 'playback;
                    }

                    // 计算等待时间
                    let record_offset = recorded.timestamp - first_timestamp;
                    let target_elapsed = Duration::from_secs_f64(record_offset / speed);
                    let actual_elapsed = start_time.elapsed();

                    if target_elapsed > actual_elapsed {
                        thread::sleep(target_elapsed - actual_elapsed);
                    }

                    let mut frames = recorded.clone();
                    shift_timestamps(&mut frames, loop_offset);
                    if let Some(skeleton) = frames.skeleton.as_mut() {
                        smoother.apply(&mut skeleton.skeletons);
                    }
                    callback(frames);
                }

                if !loop_playback {
                    info!(source_id = %source_id, "Replay completed");
                    break;
                }

                let span = last.timestamp - first.timestamp;
                let interval = recording
                    .frames
                    .get(1)
                    .map(|second| second.timestamp - first.timestamp)
                    .unwrap_or(0.0);
                loop_offset += span + interval;
                debug!(source_id = %source_id, loop_offset, "Looping replay");
            }

            listening.store(false, Ordering::SeqCst);
        });

        if let Ok(mut guard) = self.thread_handle.lock() {
            *guard = Some(handle);
        }
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        // 等待线程结束
        let handle = self
            .thread_handle
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

fn shift_timestamps(frames: &mut AllFramesReady, offset: f64) {
    if offset == 0.0 {
        return;
    }
    frames.timestamp += offset;
    if let Some(color) = frames.color.as_mut() {
        color.timestamp += offset;
    }
    if let Some(skeleton) = frames.skeleton.as_mut() {
        skeleton.timestamp += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RECORDING: &str = r#"{"kind":"frames","timestamp":0.10,"skeleton":{"timestamp":0.10,"frame_number":2,"skeletons":[]}}
{"kind":"speech","text":"hulk","confidence":0.9,"timestamp":0.05}
{"kind":"frames","timestamp":0.00,"color":{"timestamp":0.0,"frame_number":0,"format":{"width":320,"height":240,"fps":30}}}

{"kind":"frames","timestamp":0.05}
"#;

    fn write_recording(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("duel.jsonl");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn replay_config(path: PathBuf, loop_playback: bool) -> ReplayConfig {
        ReplayConfig {
            path,
            speed: 10.0,
            loop_playback,
        }
    }

    #[test]
    fn recording_sorts_frames_and_extracts_speech() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recording(&dir, RECORDING);

        let recording = Recording::load(&path).unwrap();
        let timestamps: Vec<f64> = recording.frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 0.05, 0.10]);
        assert_eq!(recording.utterances.len(), 1);
        assert_eq!(recording.utterances[0].text, "hulk");
        assert!((recording.utterances[0].at_s - 0.05).abs() < 1e-9);
        assert_eq!(recording.color_format().map(|f| f.width), Some(320));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recording(&dir, "{\"kind\":\"frames\",\"timestamp\":0.0}\nnot json\n");

        let err = Recording::load(&path).unwrap_err().to_string();
        assert!(err.contains("line 2"), "got: {err}");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = Recording::load(Path::new("/nonexistent/duel.jsonl")).unwrap_err();
        assert!(matches!(err, RigError::RecordingLoad { .. }));
    }

    #[test]
    fn replay_delivers_all_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recording(&dir, RECORDING);
        let sensor = ReplaySensor::load(
            "replay",
            replay_config(path, false),
            ColorImageFormat::default(),
            SmoothingParameters::default(),
        )
        .unwrap();
        assert_eq!(sensor.color_format().width, 320);

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        sensor.listen(Arc::new(move |frames| {
            received_clone.lock().unwrap().push(frames.timestamp);
        }));

        thread::sleep(Duration::from_millis(100));
        sensor.stop();

        assert_eq!(*received.lock().unwrap(), vec![0.0, 0.05, 0.10]);
        assert!(!sensor.is_listening());
    }

    #[test]
    fn looping_replay_keeps_clock_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recording(&dir, RECORDING);
        let sensor = ReplaySensor::load(
            "replay",
            replay_config(path, true),
            ColorImageFormat::default(),
            SmoothingParameters::default(),
        )
        .unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        sensor.listen(Arc::new(move |frames| {
            received_clone.lock().unwrap().push(frames.timestamp);
        }));

        thread::sleep(Duration::from_millis(60));
        sensor.stop();

        let timestamps = received.lock().unwrap();
        assert!(timestamps.len() > 3, "expected a second loop, got {timestamps:?}");
        assert!(timestamps.windows(2).all(|pair| pair[1] > pair[0]));
    }
}

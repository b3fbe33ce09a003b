//! SensorRig 核心实现
//!
//! 按 GameBlueprint 打开彩色/骨骼流 (带平滑参数)，再构建语音识别源。
//! 启动顺序由摄取管道保证：先传感器，后语音。

use std::sync::Arc;

use contracts::{
    ColorImageFormat, FrameSource, GameBlueprint, ScriptedUtterance, SmoothingParameters,
    SourceKind, SpeechConfig, SpeechSource,
};
use tracing::{info, instrument, warn};

use crate::error::{Result, RigError};
use crate::mock_sensor::MockSensor;
use crate::recognizer::{select_recognizer, Grammar};
use crate::replay_sensor::ReplaySensor;
use crate::scripted_speech::ScriptedSpeech;

/// 默认帧源 ID
pub const FRAME_SOURCE_ID: &str = "kinect";
/// 默认语音源 ID
pub const SPEECH_SOURCE_ID: &str = "kinect_audio";

/// 已打开的传感器组合
pub struct SensorRig {
    source_kind: SourceKind,
    frame_source: Arc<dyn FrameSource>,
    speech_source: Option<Arc<dyn SpeechSource>>,
    smoothing: SmoothingParameters,
    /// 回放录制中的语音行
    recorded_utterances: Vec<ScriptedUtterance>,
}

/// 传感器组合概要 (日志/info 命令)
#[derive(Debug, Clone)]
pub struct RigSummary {
    pub source_kind: SourceKind,
    pub frame_source_id: String,
    pub color_format: ColorImageFormat,
    pub smoothing: SmoothingParameters,
    pub speech_recognizer: Option<String>,
}

impl SensorRig {
    /// 从 GameBlueprint 打开帧源
    ///
    /// 语音源需另行调用 [`SensorRig::attach_speech`]；识别器缺失只影响语音。
    #[instrument(
        name = "sensor_rig_from_blueprint",
        skip(blueprint),
        fields(source = ?blueprint.sensor.source)
    )]
    pub fn from_blueprint(blueprint: &GameBlueprint) -> Result<Self> {
        let sensor = &blueprint.sensor;

        let (frame_source, recorded_utterances): (Arc<dyn FrameSource>, Vec<ScriptedUtterance>) =
            match sensor.source {
                SourceKind::Mock => {
                    let mock = MockSensor::new(
                        FRAME_SOURCE_ID,
                        sensor.color_format,
                        sensor.smoothing,
                        sensor.skeleton_array_length,
                        sensor.mock.clone(),
                    );
                    (Arc::new(mock), Vec::new())
                }
                SourceKind::Replay => {
                    let replay = sensor.replay.clone().ok_or_else(|| {
                        RigError::source_unavailable(
                            FRAME_SOURCE_ID,
                            "replay source selected without replay settings",
                        )
                    })?;
                    let replay_sensor = ReplaySensor::load(
                        FRAME_SOURCE_ID,
                        replay,
                        sensor.color_format,
                        sensor.smoothing,
                    )?;
                    let utterances = replay_sensor.utterances().to_vec();
                    (Arc::new(replay_sensor), utterances)
                }
            };

        let format = frame_source.color_format();
        info!(
            source_id = frame_source.source_id(),
            width = format.width,
            height = format.height,
            fps = format.fps,
            smoothing = sensor.smoothing.smoothing,
            correction = sensor.smoothing.correction,
            prediction = sensor.smoothing.prediction,
            jitter_radius = sensor.smoothing.jitter_radius,
            max_deviation_radius = sensor.smoothing.max_deviation_radius,
            "color and skeleton streams enabled"
        );

        Ok(Self {
            source_kind: sensor.source,
            frame_source,
            speech_source: None,
            smoothing: sensor.smoothing,
            recorded_utterances,
        })
    }

    /// 构建语音源
    ///
    /// # Errors
    /// 没有匹配语言 (且支持传感器音频) 的识别器时返回 `NoRecognizer`。
    #[instrument(
        name = "sensor_rig_attach_speech",
        skip(self, speech),
        fields(culture = %speech.culture)
    )]
    pub fn attach_speech(&mut self, speech: &SpeechConfig) -> Result<()> {
        if !speech.enabled {
            info!("speech commands disabled");
            return Ok(());
        }

        let recognizer = select_recognizer(
            &speech.installed_recognizers,
            &speech.culture,
            speech.require_sensor_audio,
        )?;
        let grammar = Grammar::new(speech.culture.clone(), speech.vocabulary.iter().cloned());

        let mut script = speech.script.clone();
        script.extend(self.recorded_utterances.iter().cloned());
        if script.is_empty() {
            warn!("speech source has no utterances to deliver");
        }

        self.speech_source = Some(Arc::new(ScriptedSpeech::new(
            SPEECH_SOURCE_ID,
            recognizer,
            grammar,
            script,
        )));
        Ok(())
    }

    pub fn frame_source(&self) -> Arc<dyn FrameSource> {
        self.frame_source.clone()
    }

    pub fn speech_source(&self) -> Option<Arc<dyn SpeechSource>> {
        self.speech_source.clone()
    }

    pub fn color_format(&self) -> ColorImageFormat {
        self.frame_source.color_format()
    }

    pub fn summary(&self) -> RigSummary {
        RigSummary {
            source_kind: self.source_kind,
            frame_source_id: self.frame_source.source_id().to_string(),
            color_format: self.color_format(),
            smoothing: self.smoothing,
            speech_recognizer: self
                .speech_source
                .as_ref()
                .map(|speech| speech.recognizer().id.clone()),
        }
    }

    /// 停止所有源 (语音先于传感器)
    pub fn stop(&self) {
        if let Some(speech) = &self.speech_source {
            speech.stop();
        }
        self.frame_source.stop();
    }
}

//! GameBlueprint - Config Loader 输出
//!
//! 描述完整的游戏配置：传感器、语音、对战参数、音效资源、摄取通道、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

use crate::{
    ColorImageFormat, DuelEngineConfig, PlayerAssignment, RecognizerInfo, SoundCue,
    SpeechCommandConfig, DEFAULT_BLADE_LENGTH, DEFAULT_CONNECTED_MESSAGE, DEFAULT_DISPLAY_SCALE,
    DEFAULT_GRIP_OFFSET_DEG, DEFAULT_HISTORY_CAPACITY, DEFAULT_HIT_COOLDOWN_S,
    DEFAULT_SPEECH_CONFIDENCE, DEFAULT_STARTING_STRENGTH, DEFAULT_SWING_THRESHOLD,
};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的游戏配置蓝图
///
/// 所有段落均有默认值，空配置文件即可运行模拟对战。
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GameBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 传感器设置
    #[serde(default)]
    #[validate(nested)]
    pub sensor: SensorConfig,

    /// 语音命令设置
    #[serde(default)]
    #[validate(nested)]
    pub speech: SpeechConfig,

    /// 对战参数
    #[serde(default)]
    #[validate(nested)]
    pub duel: DuelConfig,

    /// 音效资源
    #[serde(default)]
    pub audio: AudioConfig,

    /// 摄取通道
    #[serde(default)]
    #[validate(nested)]
    pub ingestion: IngestionConfig,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 传感器数据来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 合成的双人对战
    #[default]
    Mock,
    /// 回放 JSONL 录制文件
    Replay,
}

/// 传感器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorConfig {
    /// 数据来源
    #[serde(default)]
    pub source: SourceKind,

    /// 彩色流格式
    #[serde(default)]
    pub color_format: ColorImageFormat,

    /// 骨骼平滑参数
    #[serde(default)]
    #[validate(nested)]
    pub smoothing: SmoothingParameters,

    /// 骨骼槽位数
    #[serde(default = "default_skeleton_array_length")]
    #[validate(range(min = 1, max = 16))]
    pub skeleton_array_length: usize,

    /// 回放设置 (source = replay 时必填)
    #[serde(default)]
    #[validate(nested)]
    pub replay: Option<ReplayConfig>,

    /// 模拟传感器设置
    #[serde(default)]
    #[validate(nested)]
    pub mock: MockSensorConfig,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            color_format: ColorImageFormat::default(),
            smoothing: SmoothingParameters::default(),
            skeleton_array_length: default_skeleton_array_length(),
            replay: None,
            mock: MockSensorConfig::default(),
        }
    }
}

fn default_skeleton_array_length() -> usize {
    6
}

/// 骨骼平滑参数 (传给传感器驱动)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SmoothingParameters {
    #[validate(range(min = 0.0, max = 1.0))]
    pub correction: f32,

    #[validate(range(min = 0.0))]
    pub jitter_radius: f32,

    #[validate(range(min = 0.0))]
    pub max_deviation_radius: f32,

    #[validate(range(min = 0.0))]
    pub prediction: f32,

    #[validate(range(min = 0.0, max = 1.0))]
    pub smoothing: f32,
}

impl Default for SmoothingParameters {
    fn default() -> Self {
        Self {
            correction: 0.5,
            jitter_radius: 0.05,
            max_deviation_radius: 0.05,
            prediction: 0.5,
            smoothing: 0.5,
        }
    }
}

/// 回放配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplayConfig {
    /// JSONL 录制文件路径
    pub path: PathBuf,

    /// 回放速度倍率
    #[serde(default = "default_replay_speed")]
    #[validate(range(exclusive_min = 0.0))]
    pub speed: f64,

    /// 是否循环回放
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_replay_speed() -> f64 {
    1.0
}

/// 模拟传感器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MockSensorConfig {
    /// 模拟玩家数量
    #[serde(default = "default_mock_players")]
    #[validate(range(max = 2))]
    pub players: usize,

    /// 生成帧数上限 (None = 无限)
    #[serde(default)]
    pub frame_limit: Option<u64>,

    /// 是否生成彩色像素
    #[serde(default = "default_true")]
    pub include_pixels: bool,
}

impl Default for MockSensorConfig {
    fn default() -> Self {
        Self {
            players: default_mock_players(),
            frame_limit: None,
            include_pixels: true,
        }
    }
}

fn default_mock_players() -> usize {
    2
}

fn default_true() -> bool {
    true
}

/// 语音配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpeechConfig {
    /// 是否启用语音命令
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 识别语言
    #[serde(default = "default_culture")]
    #[validate(length(min = 1))]
    pub culture: String,

    /// 封闭词表
    #[serde(default = "default_vocabulary")]
    #[validate(length(min = 1))]
    pub vocabulary: Vec<String>,

    /// 置信度阈值 (含)
    #[serde(default = "default_confidence_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_threshold: f32,

    /// 只接受声明支持传感器麦克风阵列的识别器
    #[serde(default = "default_true")]
    pub require_sensor_audio: bool,

    /// 可用识别器列表 (模拟/回放环境)
    #[serde(default = "default_recognizers")]
    pub installed_recognizers: Vec<RecognizerInfo>,

    /// 模拟语音脚本
    #[serde(default)]
    pub script: Vec<ScriptedUtterance>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            culture: default_culture(),
            vocabulary: default_vocabulary(),
            confidence_threshold: default_confidence_threshold(),
            require_sensor_audio: true,
            installed_recognizers: default_recognizers(),
            script: Vec::new(),
        }
    }
}

fn default_culture() -> String {
    "en-US".to_string()
}

fn default_vocabulary() -> Vec<String> {
    vec!["hulk".to_string(), "smash".to_string()]
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_SPEECH_CONFIDENCE
}

fn default_recognizers() -> Vec<RecognizerInfo> {
    vec![RecognizerInfo::sensor_default(default_culture())]
}

/// 模拟语音脚本条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedUtterance {
    /// 相对启动时刻的延迟 (秒)
    pub at_s: f64,

    /// 识别文本
    pub text: String,

    /// 置信度
    pub confidence: f32,
}

/// 对战参数
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DuelConfig {
    /// 光剑长度 (显示像素)
    #[serde(default = "default_blade_length")]
    #[validate(range(exclusive_min = 0.0))]
    pub blade_length: f64,

    /// 握持偏角 (度)
    #[serde(default = "default_grip_offset")]
    pub grip_offset_deg: f64,

    /// 显示缩放倍率
    #[serde(default = "default_display_scale")]
    #[validate(range(exclusive_min = 0.0))]
    pub display_scale: f64,

    /// 运动历史容量
    #[serde(default = "default_history_capacity")]
    #[validate(range(min = 1))]
    pub history_capacity: usize,

    /// 挥剑触发阈值 (显示像素)
    #[serde(default = "default_swing_threshold")]
    #[validate(range(min = 0.0))]
    pub swing_threshold: f64,

    /// 初始体力
    #[serde(default = "default_starting_strength")]
    #[validate(range(min = 1))]
    pub starting_strength: i32,

    /// 受击冷却 (秒)
    #[serde(default = "default_hit_cooldown")]
    #[validate(range(min = 0.0))]
    pub hit_cooldown_s: f64,

    /// 玩家分配策略
    #[serde(default)]
    pub player_assignment: PlayerAssignment,

    /// 连接成功提示
    #[serde(default = "default_connected_message")]
    pub connected_message: String,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            blade_length: default_blade_length(),
            grip_offset_deg: default_grip_offset(),
            display_scale: default_display_scale(),
            history_capacity: default_history_capacity(),
            swing_threshold: default_swing_threshold(),
            starting_strength: default_starting_strength(),
            hit_cooldown_s: default_hit_cooldown(),
            player_assignment: PlayerAssignment::default(),
            connected_message: default_connected_message(),
        }
    }
}

fn default_blade_length() -> f64 {
    DEFAULT_BLADE_LENGTH
}

fn default_grip_offset() -> f64 {
    DEFAULT_GRIP_OFFSET_DEG
}

fn default_display_scale() -> f64 {
    DEFAULT_DISPLAY_SCALE
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_swing_threshold() -> f64 {
    DEFAULT_SWING_THRESHOLD
}

fn default_starting_strength() -> i32 {
    DEFAULT_STARTING_STRENGTH
}

fn default_hit_cooldown() -> f64 {
    DEFAULT_HIT_COOLDOWN_S
}

fn default_connected_message() -> String {
    DEFAULT_CONNECTED_MESSAGE.to_string()
}

/// 音效资源路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 挥剑音效
    #[serde(default = "default_swing_asset")]
    pub swing_asset: String,

    /// 碰撞音效
    #[serde(default = "default_clash_asset")]
    pub clash_asset: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            swing_asset: default_swing_asset(),
            clash_asset: default_clash_asset(),
        }
    }
}

impl AudioConfig {
    /// 音效对应的资源路径
    pub fn asset_for(&self, cue: SoundCue) -> &str {
        match cue {
            SoundCue::Swing { .. } => &self.swing_asset,
            SoundCue::Clash => &self.clash_asset,
        }
    }
}

fn default_swing_asset() -> String {
    "Resources/lightsabre.wav".to_string()
}

fn default_clash_asset() -> String {
    "Resources/clash.wav".to_string()
}

/// 摄取通道配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestionConfig {
    /// 通道容量
    #[serde(default = "default_channel_capacity")]
    #[validate(range(min = 1))]
    pub channel_capacity: usize,

    /// 背压策略
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

/// 丢包策略 (背压满时)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃最旧的事件
    #[default]
    DropOldest,
    /// 丢弃最新的事件
    DropNewest,
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// JSONL 文件输出 (可附带 PNG 快照)
    File,
    /// 音效播放
    Audio,
}

impl GameBlueprint {
    /// Build a DuelEngineConfig from the sensor, speech and duel sections
    pub fn to_engine_config(&self) -> DuelEngineConfig {
        let duel = &self.duel;

        let mut speech = SpeechCommandConfig {
            confidence_threshold: self.speech.confidence_threshold,
            ..SpeechCommandConfig::default()
        };
        // vocabulary order is hulk, smash
        let mut words = self.speech.vocabulary.iter();
        if let Some(hulk) = words.next() {
            speech.hulk_word = hulk.clone();
        }
        if let Some(smash) = words.next() {
            speech.smash_word = smash.clone();
        }

        DuelEngineConfig {
            color_format: self.sensor.color_format,
            blade_length: duel.blade_length,
            grip_offset_deg: duel.grip_offset_deg,
            display_scale: duel.display_scale,
            history_capacity: duel.history_capacity,
            swing_threshold: duel.swing_threshold,
            starting_strength: duel.starting_strength,
            hit_cooldown_s: duel.hit_cooldown_s,
            speech,
            player_assignment: duel.player_assignment,
            connected_message: duel.connected_message.clone(),
        }
    }

    /// Sink lookup by name
    pub fn sink(&self, name: &str) -> Option<&SinkConfig> {
        self.sinks.iter().find(|sink| sink.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults() {
        let blueprint = GameBlueprint::default();
        let config = blueprint.to_engine_config();

        assert_eq!(config.blade_length, 350.0);
        assert_eq!(config.grip_offset_deg, 45.0);
        assert_eq!(config.display_scale, 2.0);
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.swing_threshold, 100.0);
        assert_eq!(config.starting_strength, 5);
        assert_eq!(config.hit_cooldown_s, 1.0);
        assert_eq!(config.speech.hulk_word, "hulk");
        assert_eq!(config.speech.smash_word, "smash");
        assert_eq!(config.player_assignment, PlayerAssignment::Positional);
        assert_eq!(config.color_format, ColorImageFormat::RGB_640X480_FPS30);
        assert_eq!(config.connected_message, "Kinect connected");
    }

    #[test]
    fn engine_config_overrides() {
        let mut blueprint = GameBlueprint::default();
        blueprint.duel.blade_length = 200.0;
        blueprint.duel.hit_cooldown_s = 0.5;
        blueprint.duel.player_assignment = PlayerAssignment::TrackingId;
        blueprint.speech.confidence_threshold = 0.7;
        blueprint.sensor.color_format = ColorImageFormat::RGB_1280X960_FPS12;

        let config = blueprint.to_engine_config();
        assert_eq!(config.blade_length, 200.0);
        assert_eq!(config.hit_cooldown_s, 0.5);
        assert_eq!(config.player_assignment, PlayerAssignment::TrackingId);
        assert_eq!(config.speech.confidence_threshold, 0.7);
        assert_eq!(config.color_format.width, 1280);
    }

    #[test]
    fn default_blueprint_passes_range_validation() {
        assert!(GameBlueprint::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_smoothing_is_rejected() {
        let mut blueprint = GameBlueprint::default();
        blueprint.sensor.smoothing.smoothing = 1.5;
        assert!(blueprint.validate().is_err());
    }

    #[test]
    fn audio_assets_per_cue() {
        let audio = AudioConfig::default();
        assert_eq!(
            audio.asset_for(SoundCue::Swing {
                player: crate::PlayerSlot::One
            }),
            "Resources/lightsabre.wav"
        );
        assert_eq!(audio.asset_for(SoundCue::Clash), "Resources/clash.wav");
    }

    #[test]
    fn empty_toml_like_json_uses_defaults() {
        let blueprint: GameBlueprint = serde_json::from_str("{}").unwrap();
        assert_eq!(blueprint.sensor.skeleton_array_length, 6);
        assert_eq!(blueprint.sensor.smoothing.jitter_radius, 0.05);
        assert_eq!(blueprint.speech.vocabulary, vec!["hulk", "smash"]);
        assert_eq!(blueprint.ingestion.channel_capacity, 64);
        assert!(blueprint.sinks.is_empty());
    }
}

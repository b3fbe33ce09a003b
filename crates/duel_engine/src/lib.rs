//! # Duel Engine
//!
//! 单消费者的对战核心：拥有全部玩家/挥动/光剑状态。
//!
//! 负责：
//! - 帧摄取（彩色图像复制、骨骼缓冲复用）
//! - 骨骼过滤与玩家分配
//! - 光剑几何（前臂角度、握持偏移、剑尖）
//! - 挥动音效迟滞、光剑碰撞、命中/冷却/回合
//! - 语音指令与可观察状态
//! - 输出 `DuelUpdate`
//!
//! ## 使用示例
//!
//! ```ignore
//! use duel_engine::DuelEngine;
//!
//! let mut engine = DuelEngine::new(blueprint.to_engine_config());
//! engine.connect(0.0);
//!
//! while let Ok(event) = rx.recv().await {
//!     if let Some(update) = engine.push(event) {
//!         dispatcher.dispatch(update);
//!     }
//! }
//! ```

mod collision;
mod combat;
mod engine;
mod filter;
mod frame_ingest;
mod mapper;
mod motion;
mod saber;
mod speech;
mod state;

pub use collision::sabers_clash;
pub use combat::{detect_hits, HitReferee};
pub use engine::DuelEngine;
pub use filter::{Assignment, PlayerAssigner};
pub use frame_ingest::FrameIngest;
pub use mapper::{PinholeMapper, NOMINAL_FOCAL_LENGTH_PX};
pub use motion::MotionHistory;
pub use saber::SaberGeometry;
pub use speech::{CommandInterpreter, VoiceCommand};
pub use state::{ChangeSubscriber, ObservableState};

// Re-export contracts types
pub use contracts::{DuelEngineConfig, DuelUpdate, PlayerAssignment, SensorEvent};

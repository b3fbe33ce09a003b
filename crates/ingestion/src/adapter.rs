//! 源适配器 trait

use std::sync::Arc;

use async_channel::{Receiver, Sender};
use contracts::SensorEvent;

use crate::config::IngestionMetrics;

/// 源类别，决定启动顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StreamKind {
    /// 彩色 + 骨骼帧
    Frames,
    /// 语音识别结果
    Speech,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Frames => "frames",
            StreamKind::Speech => "speech",
        }
    }
}

/// 源适配器 trait
///
/// 每个适配器负责：
/// 1. 向底层源注册回调
/// 2. 将回调数据封装为 `SensorEvent`
/// 3. 发送到共享通道（处理背压）
pub trait SourceAdapter: Send + Sync {
    /// 获取源 ID
    fn source_id(&self) -> &str;

    /// 获取源类别
    fn kind(&self) -> StreamKind;

    /// 启动采集
    ///
    /// # Arguments
    /// * `tx` - 事件发送通道
    /// * `drain` - 同一通道的接收端克隆，`DropOldest` 用它弹出最旧事件
    /// * `metrics` - 共享的 ingestion 指标
    fn start(
        &self,
        tx: Sender<SensorEvent>,
        drain: Receiver<SensorEvent>,
        metrics: Arc<IngestionMetrics>,
    );

    /// 停止采集
    fn stop(&self);

    /// 是否正在监听
    fn is_listening(&self) -> bool;
}

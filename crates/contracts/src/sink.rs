//! DataSink - 对战更新的输出端
//!
//! Dispatcher 把每个 [`DuelUpdate`] 扇出给所有 sink；
//! 每个 sink 在自己的 worker 任务中顺序写入。

use crate::{ContractError, DuelUpdate};

/// Consumer of duel updates (session log, audio cues, ...)
///
/// A failed write is counted and logged by the worker; the duel keeps running.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Name used in logs and metric labels
    fn name(&self) -> &str;

    /// Handle one update, in `update_id` order
    async fn write(&mut self, update: &DuelUpdate) -> Result<(), ContractError>;

    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Called once after the dispatcher input closes
    async fn close(&mut self) -> Result<(), ContractError>;
}

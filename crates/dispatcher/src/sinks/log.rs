//! LogSink - logs update summaries via tracing

use contracts::{ContractError, DataSink, DuelUpdate, GameEvent};
use tracing::{debug, info, instrument};

/// Sink that logs duel updates for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_update(&self, update: &DuelUpdate) {
        debug!(
            sink = %self.name,
            update_id = update.update_id,
            timestamp = update.timestamp,
            tracked = update.meta.tracked_skeletons,
            sabers = update.scene.saber_count(),
            sounds = update.sounds.len(),
            changes = update.changes.len(),
            "DuelUpdate received"
        );

        for event in &update.events {
            match event {
                GameEvent::Clash => debug!(sink = %self.name, "clash"),
                GameEvent::Hit { player, strength } => {
                    info!(sink = %self.name, %player, strength, "hit")
                }
                GameEvent::RoundWon { winner, wins } => info!(
                    sink = %self.name,
                    %winner,
                    wins,
                    p1_wins = update.state.player1_wins,
                    p2_wins = update.state.player2_wins,
                    "round over"
                ),
                GameEvent::VoiceCommand {
                    command,
                    confidence,
                } => info!(sink = %self.name, %command, confidence, "voice command"),
            }
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, update),
        fields(sink = %self.name, update_id = update.update_id)
    )]
    async fn write(&mut self, update: &DuelUpdate) -> Result<(), ContractError> {
        self.log_update(update);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::update;
    use contracts::PlayerSlot;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let mut update = update(1);
        update.events = vec![
            GameEvent::Clash,
            GameEvent::RoundWon {
                winner: PlayerSlot::Two,
                wins: 1,
            },
        ];

        assert!(sink.write(&update).await.is_ok());
        assert_eq!(sink.name(), "test_log");
    }
}

//! 对战指标收集模块
//!
//! 基于 DuelUpdate 记录 Prometheus 指标，并在内存中聚合运行统计。

use std::fmt;

use contracts::{DuelUpdate, GameEvent, PlayerSlot, SoundCue};
use metrics::{counter, gauge, histogram};

use crate::stats::{RunningStats, StatsSummary};

/// 从 DuelUpdate 记录指标
///
/// 引擎每产出一个 update 调用一次。
pub fn record_duel_update(update: &DuelUpdate) {
    counter!("lightsaber_updates_total").increment(1);
    gauge!("lightsaber_last_update_id").set(update.update_id as f64);

    let meta = &update.meta;
    if meta.had_skeleton {
        gauge!("lightsaber_tracked_skeletons").set(meta.tracked_skeletons as f64);
        histogram!("lightsaber_sabers_drawn").record(update.scene.saber_count() as f64);
    }

    for sound in &update.sounds {
        match sound {
            SoundCue::Swing { player } => {
                counter!("lightsaber_swings_total", "player" => player.to_string()).increment(1)
            }
            SoundCue::Clash => counter!("lightsaber_clashes_total").increment(1),
        }
    }

    for event in &update.events {
        match event {
            GameEvent::Hit { player, .. } => {
                counter!("lightsaber_hits_total", "player" => player.to_string()).increment(1)
            }
            GameEvent::RoundWon { winner, .. } => {
                counter!("lightsaber_rounds_total", "winner" => winner.to_string()).increment(1)
            }
            GameEvent::VoiceCommand { command, .. } => {
                counter!("lightsaber_voice_commands_total", "command" => command.clone())
                    .increment(1)
            }
            GameEvent::Clash => {}
        }
    }

    for player in PlayerSlot::BOTH {
        gauge!("lightsaber_strength", "player" => player.to_string())
            .set(f64::from(update.state.strength(player)));
        gauge!("lightsaber_wins", "player" => player.to_string())
            .set(f64::from(update.state.wins(player)));
    }
}

/// 记录进入引擎的传感器事件
pub fn record_event_received(kind: &'static str) {
    counter!("lightsaber_events_received_total", "kind" => kind).increment(1);
}

/// 记录从事件出队到 update 交给 dispatcher 的耗时
pub fn record_pipeline_latency_ms(latency_ms: f64) {
    histogram!("lightsaber_pipeline_latency_ms").record(latency_ms);
}

/// 对战指标聚合器
#[derive(Debug, Clone, Default)]
pub struct DuelMetricsAggregator {
    pub total_updates: u64,
    /// Updates carrying a color or skeleton frame
    pub frame_updates: u64,
    pub frames_without_skeleton: u64,
    pub swings: [u64; 2],
    pub clashes: u64,
    pub hits: [u64; 2],
    pub rounds_won: [u64; 2],
    pub voice_commands: u64,
    pub tracked_stats: RunningStats,
    pub latency_stats: RunningStats,
}

impl DuelMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, update: &DuelUpdate) {
        self.total_updates += 1;

        let meta = &update.meta;
        if meta.had_color || meta.had_skeleton {
            self.frame_updates += 1;
            if meta.had_skeleton {
                self.tracked_stats.push(meta.tracked_skeletons as f64);
            } else {
                self.frames_without_skeleton += 1;
            }
        }

        for sound in &update.sounds {
            if let SoundCue::Swing { player } = sound {
                self.swings[player.index()] += 1;
            }
        }

        for event in &update.events {
            match event {
                GameEvent::Clash => self.clashes += 1,
                GameEvent::Hit { player, .. } => self.hits[player.index()] += 1,
                GameEvent::RoundWon { winner, .. } => self.rounds_won[winner.index()] += 1,
                GameEvent::VoiceCommand { .. } => self.voice_commands += 1,
            }
        }
    }

    pub fn record_latency_ms(&mut self, latency_ms: f64) {
        self.latency_stats.push(latency_ms);
    }

    pub fn summary(&self) -> DuelSummary {
        DuelSummary {
            total_updates: self.total_updates,
            frame_updates: self.frame_updates,
            frames_without_skeleton: self.frames_without_skeleton,
            swings: self.swings,
            clashes: self.clashes,
            hits: self.hits,
            rounds_won: self.rounds_won,
            voice_commands: self.voice_commands,
            tracked_skeletons: self.tracked_stats.summary(),
            latency_ms: self.latency_stats.summary(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuelSummary {
    pub total_updates: u64,
    pub frame_updates: u64,
    pub frames_without_skeleton: u64,
    pub swings: [u64; 2],
    pub clashes: u64,
    pub hits: [u64; 2],
    pub rounds_won: [u64; 2],
    pub voice_commands: u64,
    pub tracked_skeletons: StatsSummary,
    pub latency_ms: StatsSummary,
}

impl fmt::Display for DuelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Duel Summary ===")?;
        writeln!(f, "Updates: {} ({} frames)", self.total_updates, self.frame_updates)?;
        writeln!(f, "Frames without skeleton: {}", self.frames_without_skeleton)?;
        writeln!(f, "Swings: P1 {} / P2 {}", self.swings[0], self.swings[1])?;
        writeln!(f, "Clashes: {}", self.clashes)?;
        writeln!(f, "Hits taken: P1 {} / P2 {}", self.hits[0], self.hits[1])?;
        writeln!(
            f,
            "Rounds won: P1 {} / P2 {}",
            self.rounds_won[0], self.rounds_won[1]
        )?;
        writeln!(f, "Voice commands: {}", self.voice_commands)?;
        writeln!(f, "Tracked skeletons: {}", self.tracked_skeletons)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)
    }
}

//! Pipeline statistics and metrics.

use std::fmt;
use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::DuelMetricsAggregator;

/// Why the event loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// Sensor finished and the queue drained
    #[default]
    SensorFinished,
    /// Frame update limit reached
    MaxFrames,
    /// Run timed out
    Timeout,
    /// Ctrl+C or SIGTERM
    Signal,
    /// Ingestion channel closed
    SourcesClosed,
    /// Dispatcher stopped accepting updates
    DispatcherClosed,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::SensorFinished => "sensor finished",
            StopReason::MaxFrames => "max frames reached",
            StopReason::Timeout => "timeout",
            StopReason::Signal => "shutdown signal",
            StopReason::SourcesClosed => "sources closed",
            StopReason::DispatcherClosed => "dispatcher closed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Sensor events taken off the ingestion channel
    pub events_received: u64,

    /// Updates handed to the dispatcher
    pub updates: u64,

    /// Updates carrying a color or skeleton frame
    pub frame_updates: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    pub stop_reason: StopReason,

    /// Ingestion counters at shutdown
    pub ingestion: IngestionSnapshot,

    /// Per-sink counters after the workers drained
    pub sinks: Vec<(String, SinkSnapshot)>,

    /// Duel statistics aggregator
    pub duel: DuelMetricsAggregator,
}

impl PipelineStats {
    /// Frame updates per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frame_updates as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Events dropped by ingestion backpressure, as a percentage
    pub fn drop_rate(&self) -> f64 {
        let total = self.ingestion.events_received() + self.ingestion.events_dropped;
        if total > 0 {
            (self.ingestion.events_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Duel Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Stopped by: {}", self.stop_reason);
        println!("   ├─ Events received: {}", self.events_received);
        println!("   ├─ Updates: {} ({} frames)", self.updates, self.frame_updates);
        println!("   └─ FPS: {:.2}", self.fps());

        println!("\n📥 Ingestion");
        println!("   ├─ Frame events: {}", self.ingestion.frames_received);
        println!("   ├─ Speech events: {}", self.ingestion.speech_received);
        println!(
            "   └─ Dropped: {} ({:.2}%)",
            self.ingestion.events_dropped,
            self.drop_rate()
        );

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            let last = self.sinks.len() - 1;
            for (idx, (name, snapshot)) in self.sinks.iter().enumerate() {
                let branch = if idx == last { "└─" } else { "├─" };
                println!(
                    "   {branch} {name}: {} written, {} failed, {} dropped",
                    snapshot.write_count, snapshot.failure_count, snapshot.dropped_count
                );
            }
        }

        println!("\n{}", self.duel.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_uses_frame_updates() {
        let stats = PipelineStats {
            updates: 40,
            frame_updates: 30,
            duration: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.fps() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn drop_rate_is_zero_without_events() {
        assert_eq!(PipelineStats::default().drop_rate(), 0.0);
    }

    #[test]
    fn drop_rate_counts_dropped_against_all_offered() {
        let stats = PipelineStats {
            ingestion: IngestionSnapshot {
                frames_received: 3,
                speech_received: 0,
                events_dropped: 1,
                queue_len: 0,
            },
            ..Default::default()
        };
        assert!((stats.drop_rate() - 25.0).abs() < 1e-9);
    }
}

//! Pipeline orchestrator - coordinates all components.
//!
//! sensor rig → ingestion → duel engine → dispatcher

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{DuelUpdate, GameBlueprint, PropertyChange};
use duel_engine::DuelEngine;
use ingestion::{BackpressureConfig, IngestionPipeline};
use observability::{record_duel_update, record_event_received, record_pipeline_latency_ms};
use sensor_rig::SensorRig;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{PipelineStats, StopReason};

/// How often the loop checks whether the sensor has finished
const SENSOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the dispatcher gets to drain after the loop ends
const DISPATCHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The game blueprint, CLI overrides already applied
    pub blueprint: GameBlueprint,

    /// Maximum number of frame updates (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Ingestion channel capacity override
    pub buffer_size: Option<usize>,

    /// Attach the speech recognizer
    pub speech: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until the sensor finishes, a limit is hit or `shutdown` resolves
    pub async fn run<S>(self, shutdown: S) -> Result<PipelineStats>
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Open sensor
        let mut rig = SensorRig::from_blueprint(blueprint).context("Failed to open sensor")?;
        if self.config.speech {
            // a missing recognizer only disables voice commands
            if let Err(e) = rig.attach_speech(&blueprint.speech) {
                warn!(error = %e, "Speech recognition unavailable, continuing without it");
            }
        } else {
            info!("Voice commands disabled from CLI");
        }

        let summary = rig.summary();
        info!(
            source = ?summary.source_kind,
            frame_source = %summary.frame_source_id,
            width = summary.color_format.width,
            height = summary.color_format.height,
            fps = summary.color_format.fps,
            recognizer = summary.speech_recognizer.as_deref().unwrap_or("none"),
            "Sensor rig ready"
        );

        // Setup Ingestion Pipeline
        let mut backpressure = BackpressureConfig::from(&blueprint.ingestion);
        if let Some(size) = self.config.buffer_size {
            backpressure = BackpressureConfig::new(size, backpressure.drop_policy);
        }
        let capacity = backpressure.channel_capacity;
        let mut ingestion = IngestionPipeline::with_config(backpressure);
        ingestion
            .register_frame_source(rig.frame_source())
            .context("Failed to register frame source")?;
        if let Some(speech) = rig.speech_source() {
            ingestion
                .register_speech_source(speech)
                .context("Failed to register speech source")?;
        }
        info!(capacity, "Ingestion pipeline configured");

        // Setup Duel Engine
        let mut engine = DuelEngine::new(blueprint.to_engine_config());
        engine.subscribe(Box::new(|change: &PropertyChange| {
            debug!(property = %change.property, value = ?change.value, "State changed");
        }));

        // Setup Dispatcher
        let (update_tx, update_rx) = mpsc::channel::<DuelUpdate>(capacity);
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - duel updates will only be counted");
        }
        let dispatcher = dispatcher::create_dispatcher(
            blueprint.sinks.clone(),
            blueprint.audio.clone(),
            update_rx,
        )
        .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();
        info!(active_sinks = blueprint.sinks.len(), "Dispatcher started");

        // Start sensor
        ingestion.start_all().context("Failed to start sensor sources")?;
        let events = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;

        let mut stats = PipelineStats::default();

        let connected = engine.connect(0.0);
        observe(&mut stats, &connected);
        if update_tx.send(connected).await.is_err() {
            warn!("Dispatcher channel closed before the duel started");
        }

        info!(max_frames = ?self.config.max_frames, timeout = ?self.config.timeout, "Duel running");

        let frame_source = rig.frame_source();
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);
        let mut poll = tokio::time::interval(SENSOR_POLL_INTERVAL);

        stats.stop_reason = loop {
            tokio::select! {
                _ = &mut shutdown => break StopReason::Signal,
                _ = &mut deadline => break StopReason::Timeout,
                event = events.recv() => {
                    let Ok(event) = event else {
                        break StopReason::SourcesClosed;
                    };
                    let dequeued = Instant::now();
                    stats.events_received += 1;
                    record_event_received(event.kind());

                    let Some(update) = engine.push(event) else {
                        continue;
                    };
                    let is_frame = update.meta.had_color || update.meta.had_skeleton;
                    observe(&mut stats, &update);

                    if update_tx.send(update).await.is_err() {
                        warn!("Dispatcher channel closed");
                        break StopReason::DispatcherClosed;
                    }
                    let latency_ms = dequeued.elapsed().as_secs_f64() * 1000.0;
                    record_pipeline_latency_ms(latency_ms);
                    stats.duel.record_latency_ms(latency_ms);

                    if is_frame {
                        if let Some(max) = self.config.max_frames {
                            if stats.frame_updates >= max {
                                info!(frames = stats.frame_updates, "Reached max frames limit");
                                break StopReason::MaxFrames;
                            }
                        }
                    }
                }
                _ = poll.tick() => {
                    if !frame_source.is_listening() && events.is_empty() {
                        info!("Sensor finished and event queue drained");
                        break StopReason::SensorFinished;
                    }
                }
            }
        };

        if stats.stop_reason == StopReason::Timeout {
            warn!(timeout = ?self.config.timeout, "Duel timed out");
        }

        // Shutdown
        info!(reason = %stats.stop_reason, "Shutting down pipeline...");
        ingestion.stop_all();
        rig.stop();
        stats.ingestion = ingestion.metrics().snapshot();
        drop(update_tx);

        match tokio::time::timeout(DISPATCHER_DRAIN_TIMEOUT, dispatcher_handle).await {
            Ok(Ok(sinks)) => stats.sinks = sinks,
            Ok(Err(e)) => warn!(error = %e, "Dispatcher task failed"),
            Err(_) => warn!("Dispatcher did not drain in time"),
        }

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Fold one update into metrics and run statistics
fn observe(stats: &mut PipelineStats, update: &DuelUpdate) {
    record_duel_update(update);
    stats.duel.update(update);
    stats.updates += 1;
    if update.meta.had_color || update.meta.had_skeleton {
        stats.frame_updates += 1;
    }
}

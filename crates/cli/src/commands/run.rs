//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{GameBlueprint, ReplayConfig, SourceKind};
use std::time::Duration;
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_duel(args: &RunArgs) -> Result<()> {
    if let Some(path) = &args.config {
        info!(config = %path.display(), "Loading configuration");
    }
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    info!(
        source = ?blueprint.sensor.source,
        players = blueprint.sensor.mock.players,
        speech = blueprint.speech.enabled && !args.no_speech,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!(port = args.metrics_port, "Metrics endpoint available");
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_frames: (args.max_frames != 0).then_some(args.max_frames),
        timeout: (args.timeout != 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        speech: !args.no_speech,
    };

    info!("Starting duel...");

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Duel pipeline failed")?;

    info!(
        updates = stats.updates,
        frames = stats.frame_updates,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        stopped_by = %stats.stop_reason,
        "Duel finished"
    );
    stats.print_summary();

    Ok(())
}

/// Replay flags replace the configured sensor source
fn apply_overrides(blueprint: &mut GameBlueprint, args: &RunArgs) {
    let Some(path) = &args.replay else {
        return;
    };

    info!(path = %path.display(), "Overriding sensor source with replay from CLI");
    let previous = blueprint.sensor.replay.take();
    blueprint.sensor.source = SourceKind::Replay;
    blueprint.sensor.replay = Some(ReplayConfig {
        path: path.clone(),
        speed: args
            .replay_speed
            .or(previous.as_ref().map(|replay| replay.speed))
            .unwrap_or(1.0),
        loop_playback: args.replay_loop,
    });
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that fails to install never resolves; the duel still ends on its own limits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, stopping duel..."),
        _ = terminate => warn!("Received SIGTERM, stopping duel..."),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &GameBlueprint) {
    let sensor = &blueprint.sensor;
    let format = sensor.color_format;

    println!("\n=== Configuration Summary ===\n");
    println!("Sensor:");
    println!("  Source: {:?}", sensor.source);
    println!("  Color: {}x{} @ {}fps", format.width, format.height, format.fps);
    match (&sensor.source, &sensor.replay) {
        (SourceKind::Replay, Some(replay)) => println!(
            "  Replay: {} (x{}{})",
            replay.path.display(),
            replay.speed,
            if replay.loop_playback { ", looping" } else { "" }
        ),
        _ => println!(
            "  Mock players: {} (frame limit: {})",
            sensor.mock.players,
            sensor
                .mock
                .frame_limit
                .map_or_else(|| "none".to_string(), |limit| limit.to_string())
        ),
    }

    let duel = &blueprint.duel;
    println!("\nDuel:");
    println!("  Blade length: {}px", duel.blade_length);
    println!("  Swing threshold: {}px", duel.swing_threshold);
    println!("  Starting strength: {}", duel.starting_strength);
    println!("  Hit cooldown: {}s", duel.hit_cooldown_s);

    println!("\nSpeech:");
    if blueprint.speech.enabled {
        println!(
            "  {} [{}] threshold {}",
            blueprint.speech.culture,
            blueprint.speech.vocabulary.join(", "),
            blueprint.speech.confidence_threshold
        );
    } else {
        println!("  disabled");
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::GameBlueprint;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    sensor: SensorInfo,
    duel: DuelInfo,
    speech: SpeechInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SensorInfo {
    source: String,
    width: u32,
    height: u32,
    fps: u32,
    skeleton_slots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mock_players: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smoothing: Option<contracts::SmoothingParameters>,
}

#[derive(Serialize)]
struct DuelInfo {
    blade_length: f64,
    grip_offset_deg: f64,
    swing_threshold: f64,
    history_capacity: usize,
    starting_strength: i32,
    hit_cooldown_s: f64,
    player_assignment: String,
}

#[derive(Serialize)]
struct SpeechInfo {
    enabled: bool,
    culture: String,
    vocabulary: Vec<String>,
    confidence_threshold: f32,
    /// Recognizer that would be selected, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    recognizer: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    if let Some(path) = &args.config {
        info!(config = %path.display(), "Loading configuration info");
    }

    let blueprint = load_blueprint(args.config.as_deref())?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

/// Recognizer id the rig would pick for this blueprint
fn selected_recognizer(blueprint: &GameBlueprint) -> Option<String> {
    let speech = &blueprint.speech;
    if !speech.enabled {
        return None;
    }
    sensor_rig::select_recognizer(
        &speech.installed_recognizers,
        &speech.culture,
        speech.require_sensor_audio,
    )
    .ok()
    .map(|recognizer| recognizer.id)
}

fn build_config_info(blueprint: &GameBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensor = &blueprint.sensor;
    let duel = &blueprint.duel;
    let speech = &blueprint.speech;

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        sensor: SensorInfo {
            source: format!("{:?}", sensor.source),
            width: sensor.color_format.width,
            height: sensor.color_format.height,
            fps: sensor.color_format.fps,
            skeleton_slots: sensor.skeleton_array_length,
            replay_path: sensor
                .replay
                .as_ref()
                .map(|replay| replay.path.display().to_string()),
            mock_players: args.sensor.then_some(sensor.mock.players),
            smoothing: args.sensor.then_some(sensor.smoothing),
        },
        duel: DuelInfo {
            blade_length: duel.blade_length,
            grip_offset_deg: duel.grip_offset_deg,
            swing_threshold: duel.swing_threshold,
            history_capacity: duel.history_capacity,
            starting_strength: duel.starting_strength,
            hit_cooldown_s: duel.hit_cooldown_s,
            player_assignment: format!("{:?}", duel.player_assignment),
        },
        speech: SpeechInfo {
            enabled: speech.enabled,
            culture: speech.culture.clone(),
            vocabulary: speech.vocabulary.clone(),
            confidence_threshold: speech.confidence_threshold,
            recognizer: selected_recognizer(blueprint),
        },
        sinks,
    }
}

fn print_config_info(blueprint: &GameBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Lightsaber Duel Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let sensor = &blueprint.sensor;
    let format = sensor.color_format;
    println!("📷 Sensor");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Source: {:?}", sensor.source);
    println!("   ├─ Color: {}x{} @ {}fps", format.width, format.height, format.fps);
    match &sensor.replay {
        Some(replay) => println!("   ├─ Replay: {} (x{})", replay.path.display(), replay.speed),
        None => println!("   ├─ Replay: (none)"),
    }
    println!("   └─ Skeleton slots: {}", sensor.skeleton_array_length);

    if args.sensor {
        let smoothing = &sensor.smoothing;
        println!("      ├─ Mock players: {}", sensor.mock.players);
        println!(
            "      └─ Smoothing: correction {} / jitter {} / max deviation {} / prediction {} / smoothing {}",
            smoothing.correction,
            smoothing.jitter_radius,
            smoothing.max_deviation_radius,
            smoothing.prediction,
            smoothing.smoothing
        );
    }

    let duel = &blueprint.duel;
    println!("\n⚔️  Duel");
    println!("   ├─ Blade: {}px at {}° grip offset", duel.blade_length, duel.grip_offset_deg);
    println!(
        "   ├─ Swing: {}px over {} positions",
        duel.swing_threshold, duel.history_capacity
    );
    println!(
        "   ├─ Strength: {} (cooldown {}s)",
        duel.starting_strength, duel.hit_cooldown_s
    );
    println!("   └─ Assignment: {:?}", duel.player_assignment);

    let speech = &blueprint.speech;
    println!("\n🎙  Speech");
    if speech.enabled {
        println!("   ├─ Culture: {}", speech.culture);
        println!("   ├─ Vocabulary: [{}]", speech.vocabulary.join(", "));
        println!("   ├─ Threshold: {}", speech.confidence_threshold);
        match selected_recognizer(blueprint) {
            Some(id) => println!("   └─ Recognizer: {}", id),
            None => println!("   └─ Recognizer: (none installed for {})", speech.culture),
        }
    } else {
        println!("   └─ disabled");
    }

    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    } else {
        println!("\n📤 Sinks: {}", blueprint.sinks.len());
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(sensor: bool, sinks: bool) -> InfoArgs {
        InfoArgs {
            config: None,
            json: true,
            sensor,
            sinks,
        }
    }

    #[test]
    fn json_hides_details_unless_asked() {
        let info = build_config_info(&GameBlueprint::default(), &args(false, false));
        let json = serde_json::to_value(&info).unwrap();

        assert!(json["sensor"].get("smoothing").is_none());
        assert!(json.get("sinks").is_none());
        assert_eq!(json["duel"]["starting_strength"], 5);
    }

    #[test]
    fn sensor_flag_adds_smoothing() {
        let info = build_config_info(&GameBlueprint::default(), &args(true, false));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["sensor"]["smoothing"]["correction"], 0.5);
        assert_eq!(json["sensor"]["mock_players"], 2);
    }

    #[test]
    fn disabled_speech_has_no_recognizer() {
        let mut blueprint = GameBlueprint::default();
        blueprint.speech.enabled = false;
        assert!(selected_recognizer(&blueprint).is_none());
    }
}

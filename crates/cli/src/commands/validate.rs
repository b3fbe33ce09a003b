//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GameBlueprint, SinkType, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source: String,
    color_format: String,
    sink_count: usize,
    speech_enabled: bool,
    vocabulary: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let format = blueprint.sensor.color_format;

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    source: format!("{:?}", blueprint.sensor.source),
                    color_format: format!("{}x{}@{}", format.width, format.height, format.fps),
                    sink_count: blueprint.sinks.len(),
                    speech_enabled: blueprint.speech.enabled,
                    vocabulary: blueprint.speech.vocabulary.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &GameBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - duel updates will only be counted".to_string());
    } else if !blueprint
        .sinks
        .iter()
        .any(|sink| sink.sink_type == SinkType::Audio)
    {
        warnings.push("No audio sink configured - swing and clash cues are silent".to_string());
    }

    if blueprint.duel.history_capacity < 2 {
        warnings.push(format!(
            "duel.history_capacity = {} - swings need at least two tracked positions",
            blueprint.duel.history_capacity
        ));
    }

    match blueprint.sensor.source {
        SourceKind::Mock => {
            if blueprint.sensor.replay.is_some() {
                warnings.push("sensor.replay is ignored while sensor.source = mock".to_string());
            }
            if blueprint.sensor.mock.frame_limit.is_none() {
                warnings.push(
                    "sensor.mock.frame_limit is unset - the duel runs until stopped".to_string(),
                );
            }
        }
        SourceKind::Replay => {}
    }

    let speech = &blueprint.speech;
    if !speech.enabled {
        warnings.push("Speech commands disabled - 'hulk' and 'smash' are ignored".to_string());
    } else if speech.script.is_empty() && blueprint.sensor.source == SourceKind::Mock {
        warnings.push("speech.script is empty - no voice commands will be heard".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source);
            println!("  Color format: {}", summary.color_format);
            println!("  Sinks: {}", summary.sink_count);
            if summary.speech_enabled {
                println!("  Speech: [{}]", summary.vocabulary.join(", "));
            } else {
                println!("  Speech: disabled");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

//! 配置校验模块
//!
//! 校验规则：
//! - 数值范围 (derive 声明于 contracts)
//! - 彩色流分辨率 / 帧率 > 0
//! - source = replay 时回放路径必填
//! - 词表包含 hulk / smash 两个非空且不重复的词
//! - 音效资源路径非空
//! - sink 名称非空且唯一，队列容量 > 0

use std::collections::HashSet;

use ::validator::{Validate, ValidationErrors, ValidationErrorsKind};
use contracts::{ContractError, GameBlueprint, SourceKind};

/// 校验 GameBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    validate_ranges(blueprint)?;
    validate_color_format(blueprint)?;
    validate_source(blueprint)?;
    validate_vocabulary(blueprint)?;
    validate_audio(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 derive 声明的数值范围
fn validate_ranges(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    match blueprint.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = first_violation("", &errors)
                .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
            Err(ContractError::config_validation(field, message))
        }
    }
}

/// 深度优先取第一个违规字段，返回 (路径, 描述)
fn first_violation(prefix: &str, errors: &ValidationErrors) -> Option<(String, String)> {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    let mut message = match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("failed '{}' check", error.code),
                    };
                    if let Some(value) = error.params.get("value") {
                        message.push_str(&format!(", got {value}"));
                    }
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_violation(&path, inner) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_violation(&format!("{path}[{idx}]"), inner) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// 校验彩色流格式
fn validate_color_format(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    let format = blueprint.sensor.color_format;
    if format.width == 0 || format.height == 0 {
        return Err(ContractError::config_validation(
            "sensor.color_format",
            format!(
                "resolution must be non-zero, got {}x{}",
                format.width, format.height
            ),
        ));
    }
    if format.fps == 0 {
        return Err(ContractError::config_validation(
            "sensor.color_format.fps",
            "fps must be > 0",
        ));
    }
    Ok(())
}

/// 校验数据来源
fn validate_source(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    if blueprint.sensor.source != SourceKind::Replay {
        return Ok(());
    }

    match &blueprint.sensor.replay {
        None => Err(ContractError::config_validation(
            "sensor.replay",
            "replay source requires a [sensor.replay] section",
        )),
        Some(replay) if replay.path.as_os_str().is_empty() => Err(
            ContractError::config_validation("sensor.replay.path", "replay path cannot be empty"),
        ),
        Some(_) => Ok(()),
    }
}

/// 校验语音词表
fn validate_vocabulary(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    let vocabulary = &blueprint.speech.vocabulary;
    if vocabulary.len() != 2 {
        return Err(ContractError::config_validation(
            "speech.vocabulary",
            format!(
                "vocabulary must list exactly the hulk and smash words, got {} entries",
                vocabulary.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, word) in vocabulary.iter().enumerate() {
        if word.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("speech.vocabulary[{idx}]"),
                "vocabulary word cannot be empty",
            ));
        }
        if !seen.insert(word.to_lowercase()) {
            return Err(ContractError::config_validation(
                format!("speech.vocabulary[{idx}]"),
                format!("duplicate vocabulary word '{word}'"),
            ));
        }
    }
    Ok(())
}

/// 校验音效资源
fn validate_audio(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    let audio = &blueprint.audio;
    for (field, asset) in [
        ("audio.swing_asset", &audio.swing_asset),
        ("audio.clash_asset", &audio.clash_asset),
    ] {
        if asset.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "sound asset path cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &GameBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ReplayConfig, SinkConfig, SinkType};

    fn minimal_blueprint() -> GameBlueprint {
        GameBlueprint {
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: Default::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_range_violation_reports_nested_path() {
        let mut bp = minimal_blueprint();
        bp.sensor.smoothing.correction = 2.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("sensor.smoothing.correction"), "got: {err}");
    }

    #[test]
    fn test_confidence_threshold_range() {
        let mut bp = minimal_blueprint();
        bp.speech.confidence_threshold = 1.5;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("speech.confidence_threshold"), "got: {err}");
    }

    #[test]
    fn test_zero_history_capacity() {
        let mut bp = minimal_blueprint();
        bp.duel.history_capacity = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duel.history_capacity"), "got: {err}");
    }

    #[test]
    fn test_zero_resolution() {
        let mut bp = minimal_blueprint();
        bp.sensor.color_format.width = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("resolution must be non-zero"), "got: {err}");
    }

    #[test]
    fn test_replay_requires_section() {
        let mut bp = minimal_blueprint();
        bp.sensor.source = SourceKind::Replay;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("sensor.replay"), "got: {err}");

        bp.sensor.replay = Some(ReplayConfig {
            path: "".into(),
            speed: 1.0,
            loop_playback: false,
        });
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("replay path cannot be empty"), "got: {err}");

        bp.sensor.replay = Some(ReplayConfig {
            path: "duel.jsonl".into(),
            speed: 1.0,
            loop_playback: false,
        });
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_vocabulary_rules() {
        let mut bp = minimal_blueprint();
        bp.speech.vocabulary = vec!["hulk".into()];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("exactly the hulk and smash"), "got: {err}");

        bp.speech.vocabulary = vec!["hulk".into(), "HULK".into()];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate vocabulary word"), "got: {err}");

        bp.speech.vocabulary = vec!["hulk".into(), "  ".into()];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_empty_audio_asset() {
        let mut bp = minimal_blueprint();
        bp.audio.clash_asset = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("audio.clash_asset"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = "".into();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("sink name cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].queue_capacity = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("queue_capacity must be > 0"), "got: {err}");
    }
}

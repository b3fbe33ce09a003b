//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置合约测试
//! - 脚本化 e2e 测试（无需真实传感器）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::GameBlueprint;

    #[test]
    fn test_default_blueprint_survives_toml() {
        let toml = ConfigLoader::to_toml(&GameBlueprint::default()).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.duel.starting_strength, 5);
        assert_eq!(parsed.speech.vocabulary, vec!["hulk", "smash"]);
        assert_eq!(parsed.sensor.color_format.width, 640);
    }

    #[test]
    fn test_engine_config_follows_blueprint() {
        let mut blueprint = GameBlueprint::default();
        blueprint.duel.blade_length = 200.0;
        blueprint.speech.confidence_threshold = 0.8;

        let config = blueprint.to_engine_config();
        assert_eq!(config.blade_length, 200.0);
        assert_eq!(config.speech.confidence_threshold, 0.8);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        AllFramesReady, ColorImageFormat, ColorPoint, CoordinateMapper, DuelUpdate,
        DuelEngineConfig, GameBlueprint, GameEvent, JointType, PlayerSlot, ScriptedUtterance,
        SensorEvent, SinkConfig, SinkType, Skeleton, SkeletonFrame, SkeletonPoint, SoundCue,
        SpeechResult,
    };
    use dispatcher::create_dispatcher;
    use duel_engine::DuelEngine;
    use ingestion::{EventReceiver, IngestionPipeline, MockFrameSource, MockSpeechSource};
    use observability::DuelMetricsAggregator;
    use sensor_rig::SensorRig;
    use tokio::sync::mpsc;

    /// Skeleton coordinates are already color pixels
    struct PixelMapper;

    impl CoordinateMapper for PixelMapper {
        fn map_skeleton_point_to_color_point(
            &self,
            point: SkeletonPoint,
            _format: ColorImageFormat,
        ) -> ColorPoint {
            ColorPoint::new(point.x.round() as i32, point.y.round() as i32)
        }
    }

    fn at(x: f32, y: f32) -> SkeletonPoint {
        SkeletonPoint::new(x, y, 2.0)
    }

    /// Right-handed fighter whose blade reaches player two's shoulder
    fn player_one() -> Skeleton {
        Skeleton::tracked(11)
            .with_joint(JointType::WristRight, at(300.0, 200.0))
            .with_joint(JointType::ElbowRight, at(250.0, 200.0))
            .with_joint(JointType::HandRight, at(300.0, 200.0))
            .with_joint(JointType::ShoulderRight, at(450.0, 180.0))
            .with_joint(JointType::Head, at(300.0, 40.0))
    }

    /// Left-handed fighter crossing player one's blade
    fn player_two() -> Skeleton {
        Skeleton::tracked(22)
            .with_joint(JointType::WristLeft, at(500.0, 200.0))
            .with_joint(JointType::ElbowLeft, at(550.0, 210.0))
            .with_joint(JointType::HandLeft, at(500.0, 200.0))
            .with_joint(JointType::ShoulderLeft, at(480.0, 180.0))
            .with_joint(JointType::Head, at(520.0, 40.0))
    }

    fn duel_frame(timestamp: f64) -> AllFramesReady {
        let mut skeletons = vec![player_one(), player_two()];
        skeletons.resize(6, Skeleton::default());
        AllFramesReady {
            timestamp,
            color: None,
            skeleton: Some(SkeletonFrame {
                timestamp,
                frame_number: (timestamp * 30.0) as u64,
                skeletons,
            }),
        }
    }

    fn log_sink(name: &str) -> SinkConfig {
        SinkConfig {
            name: name.to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 64,
            params: HashMap::new(),
        }
    }

    /// Drain `expected` events through the engine, forwarding every update
    async fn drive(
        engine: &mut DuelEngine,
        events: EventReceiver,
        update_tx: &mpsc::Sender<DuelUpdate>,
        expected: usize,
    ) -> Vec<DuelUpdate> {
        let mut updates = Vec::new();
        for _ in 0..expected {
            let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                .await
                .expect("event stream stalled")
                .expect("event stream closed");
            if let Some(update) = engine.push(event) {
                update_tx.send(update.clone()).await.unwrap();
                updates.push(update);
            }
        }
        updates
    }

    /// Scripted duel: hits, a round win and a voice command through the whole chain
    ///
    /// MockFrameSource + MockSpeechSource -> IngestionPipeline -> DuelEngine -> Dispatcher
    #[tokio::test]
    async fn test_e2e_scripted_duel() {
        let timestamps = [0.0, 0.5, 1.0, 2.0, 3.0, 4.0];
        let frames: Vec<AllFramesReady> = timestamps.iter().map(|&t| duel_frame(t)).collect();
        let frame_source = Arc::new(MockFrameSource::new(
            "kinect",
            ColorImageFormat::default(),
            frames,
            Duration::from_millis(5),
        ));
        let speech_source = Arc::new(MockSpeechSource::new(
            "kinect_audio",
            vec![SpeechResult {
                text: "Hulk".into(),
                confidence: 0.9,
                timestamp: 0.0,
            }],
            Duration::from_millis(5),
        ));

        let mut ingestion = IngestionPipeline::new(64);
        ingestion.register_frame_source(frame_source).unwrap();
        ingestion.register_speech_source(speech_source).unwrap();

        let mut engine =
            DuelEngine::with_mapper(DuelEngineConfig::default(), Arc::new(PixelMapper));

        let (update_tx, update_rx) = mpsc::channel::<DuelUpdate>(64);
        let dispatcher = create_dispatcher(
            vec![log_sink("log"), {
                let mut audio = log_sink("audio");
                audio.sink_type = SinkType::Audio;
                audio
            }],
            Default::default(),
            update_rx,
        )
        .unwrap();
        let dispatcher_handle = dispatcher.spawn();

        ingestion.start_all().unwrap();
        let events = ingestion.take_receiver().unwrap();

        let connected = engine.connect(0.0);
        update_tx.send(connected).await.unwrap();

        let updates = drive(&mut engine, events, &update_tx, timestamps.len() + 1).await;
        ingestion.stop_all();
        drop(update_tx);

        let sinks = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle)
            .await
            .expect("dispatcher did not drain")
            .unwrap();

        let mut aggregator = DuelMetricsAggregator::new();
        for update in &updates {
            aggregator.update(update);
        }

        // every frame crosses the blades
        assert_eq!(aggregator.clashes, timestamps.len() as u64);
        // 0.5 falls inside the cooldown; the fifth hit ends the round
        assert_eq!(aggregator.hits, [5, 0]);
        assert_eq!(aggregator.rounds_won, [0, 1]);
        assert_eq!(aggregator.voice_commands, 1);

        let last = engine.state().snapshot();
        assert!(last.hulk_mode);
        assert!(last.game_mode);
        assert_eq!(last.player2_wins, 1);
        assert_eq!(last.player1_strength, 5);

        // connect update plus every engine update reached both sinks
        for (name, snapshot) in &sinks {
            assert_eq!(snapshot.write_count, updates.len() as u64 + 1, "sink {name}");
            assert_eq!(snapshot.failure_count, 0, "sink {name}");
        }
    }

    /// Low-confidence speech never reaches the dispatcher
    #[tokio::test]
    async fn test_e2e_rejected_speech_produces_no_update() {
        let frame_source = Arc::new(MockFrameSource::new(
            "kinect",
            ColorImageFormat::default(),
            vec![duel_frame(0.0)],
            Duration::from_millis(1),
        ));
        let speech_source = Arc::new(MockSpeechSource::new(
            "kinect_audio",
            vec![SpeechResult {
                text: "smash".into(),
                confidence: 0.2,
                timestamp: 0.0,
            }],
            Duration::from_millis(1),
        ));

        let mut ingestion = IngestionPipeline::new(16);
        ingestion.register_frame_source(frame_source).unwrap();
        ingestion.register_speech_source(speech_source).unwrap();
        ingestion.start_all().unwrap();
        let events = ingestion.take_receiver().unwrap();

        let mut engine =
            DuelEngine::with_mapper(DuelEngineConfig::default(), Arc::new(PixelMapper));
        let (update_tx, mut update_rx) = mpsc::channel::<DuelUpdate>(16);

        let updates = drive(&mut engine, events, &update_tx, 2).await;
        ingestion.stop_all();
        drop(update_tx);

        assert_eq!(updates.len(), 1);
        assert!(updates[0].sounds.contains(&SoundCue::Clash));
        assert!(update_rx.recv().await.is_some());
        assert!(update_rx.recv().await.is_none());
        assert!(!engine.state().hulk_mode());
    }

    /// Synthetic sensor rig with a scripted "hulk" feeding the file sink
    #[tokio::test]
    async fn test_e2e_sensor_rig_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();

        let mut blueprint = GameBlueprint::default();
        blueprint.sensor.mock.frame_limit = Some(30);
        blueprint.sensor.mock.include_pixels = false;
        blueprint.sensor.color_format.fps = 200;
        blueprint.speech.script = vec![ScriptedUtterance {
            at_s: 0.0,
            text: "hulk".into(),
            confidence: 0.95,
        }];
        blueprint.sinks = vec![SinkConfig {
            name: "file".into(),
            sink_type: SinkType::File,
            queue_capacity: 256,
            params: HashMap::from([(
                "base_path".to_string(),
                dir.path().display().to_string(),
            )]),
        }];

        let mut rig = SensorRig::from_blueprint(&blueprint).unwrap();
        rig.attach_speech(&blueprint.speech).unwrap();

        let mut ingestion = IngestionPipeline::new(256);
        ingestion.register_frame_source(rig.frame_source()).unwrap();
        ingestion
            .register_speech_source(rig.speech_source().unwrap())
            .unwrap();

        let mut engine = DuelEngine::new(blueprint.to_engine_config());
        let (update_tx, update_rx) = mpsc::channel::<DuelUpdate>(256);
        let dispatcher =
            create_dispatcher(blueprint.sinks.clone(), blueprint.audio.clone(), update_rx)
                .unwrap();
        let dispatcher_handle = dispatcher.spawn();

        ingestion.start_all().unwrap();
        let events = ingestion.take_receiver().unwrap();

        // 30 frames plus the voice command
        let updates = drive(&mut engine, events, &update_tx, 31).await;
        ingestion.stop_all();
        rig.stop();
        drop(update_tx);

        let sinks = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle)
            .await
            .expect("dispatcher did not drain")
            .unwrap();

        let frame_updates = updates
            .iter()
            .filter(|update| update.meta.had_skeleton)
            .count();
        assert_eq!(frame_updates, 30);
        assert!(updates.iter().any(|update| update.scene.saber1.is_some()));
        assert!(updates.iter().any(|update| update
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::VoiceCommand { .. }))));
        assert!(engine.state().hulk_mode());

        assert_eq!(sinks[0].1.write_count, updates.len() as u64);

        let session = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
            .expect("session file");
        let lines = std::fs::read_to_string(session).unwrap();
        assert_eq!(lines.lines().count(), updates.len());

        let first: serde_json::Value = serde_json::from_str(lines.lines().next().unwrap()).unwrap();
        assert!(first.get("update_id").is_some());
    }

    /// Both sabers need a tracked player; a lone fighter never scores
    #[test]
    fn test_single_player_never_scores() {
        let mut engine =
            DuelEngine::with_mapper(DuelEngineConfig::default(), Arc::new(PixelMapper));

        for t in 0..10 {
            let mut skeletons = vec![player_one()];
            skeletons.resize(6, Skeleton::default());
            let update = engine
                .push(SensorEvent::Frames(AllFramesReady {
                    timestamp: f64::from(t),
                    color: None,
                    skeleton: Some(SkeletonFrame {
                        timestamp: f64::from(t),
                        frame_number: t as u64,
                        skeletons,
                    }),
                }))
                .unwrap();
            assert!(update.events.is_empty());
        }

        assert_eq!(engine.state().strength(PlayerSlot::One), 5);
        assert_eq!(engine.state().strength(PlayerSlot::Two), 5);
        assert!(!engine.state().game_mode());
    }
}

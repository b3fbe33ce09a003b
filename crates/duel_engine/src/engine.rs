//! Main duel engine implementation.

use std::sync::Arc;

use contracts::{
    AllFramesReady, CoordinateMapper, DisplayImage, DuelEngineConfig, DuelMeta, DuelScene,
    DuelUpdate, GameEvent, PlayerSlot, SensorEvent, SoundCue, SpeechResult, StatusColor,
};
use metrics::counter;
use tracing::{debug, info, instrument, trace};

use crate::collision::sabers_clash;
use crate::combat::{detect_hits, HitReferee};
use crate::filter::PlayerAssigner;
use crate::frame_ingest::FrameIngest;
use crate::mapper::PinholeMapper;
use crate::motion::MotionHistory;
use crate::saber::SaberGeometry;
use crate::speech::{CommandInterpreter, VoiceCommand};
use crate::state::{ChangeSubscriber, ObservableState};

/// Per-frame output under construction
#[derive(Default)]
struct FrameOutput {
    image: Option<DisplayImage>,
    scene: DuelScene,
    sounds: Vec<SoundCue>,
    events: Vec<GameEvent>,
    meta: DuelMeta,
}

/// Single-consumer duel core
///
/// Owns every piece of player, motion and saber state. Sensor events go in
/// through [`DuelEngine::push`], one [`DuelUpdate`] comes out per frame.
pub struct DuelEngine {
    config: DuelEngineConfig,
    mapper: Arc<dyn CoordinateMapper>,
    geometry: SaberGeometry,
    ingest: FrameIngest,
    assigner: PlayerAssigner,
    /// Tip history of player one / player two
    histories: [MotionHistory; 2],
    referee: HitReferee,
    interpreter: CommandInterpreter,
    state: ObservableState,
    update_counter: u64,
}

impl std::fmt::Debug for DuelEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuelEngine")
            .field("config", &self.config)
            .field("histories", &self.histories)
            .field("referee", &self.referee)
            .field("state", &self.state)
            .field("update_counter", &self.update_counter)
            .finish_non_exhaustive()
    }
}

impl DuelEngine {
    /// Create an engine projecting joints with the nominal pinhole model
    pub fn new(config: DuelEngineConfig) -> Self {
        Self::with_mapper(config, Arc::new(PinholeMapper::default()))
    }

    /// Create an engine with a custom coordinate mapper
    pub fn with_mapper(config: DuelEngineConfig, mapper: Arc<dyn CoordinateMapper>) -> Self {
        let history = || MotionHistory::new(config.history_capacity, config.swing_threshold);

        Self {
            mapper,
            geometry: SaberGeometry::from_config(&config),
            ingest: FrameIngest::new(),
            assigner: PlayerAssigner::new(config.player_assignment),
            histories: [history(), history()],
            referee: HitReferee::new(config.hit_cooldown_s, config.starting_strength),
            interpreter: CommandInterpreter::new(config.speech.clone()),
            state: ObservableState::new(config.starting_strength),
            update_counter: 0,
            config,
        }
    }

    pub fn config(&self) -> &DuelEngineConfig {
        &self.config
    }

    pub fn state(&self) -> &ObservableState {
        &self.state
    }

    pub fn history(&self, player: PlayerSlot) -> &MotionHistory {
        &self.histories[player.index()]
    }

    /// Register a property change callback
    pub fn subscribe(&mut self, subscriber: ChangeSubscriber) {
        self.state.subscribe(subscriber);
    }

    /// Mark the sensor as running
    pub fn connect(&mut self, timestamp: f64) -> DuelUpdate {
        self.state.set_message(self.config.connected_message.clone());
        info!(message = %self.config.connected_message, "sensor connected");
        self.finish(timestamp, FrameOutput::default())
    }

    /// Process one sensor event
    ///
    /// Frame events always produce an update. Speech events produce one only
    /// when a command was accepted.
    #[instrument(
        level = "trace",
        name = "duel_engine_push",
        skip(self, event),
        fields(kind = event.kind(), timestamp = event.timestamp())
    )]
    pub fn push(&mut self, event: SensorEvent) -> Option<DuelUpdate> {
        counter!("lightsaber_engine_events_total", "kind" => event.kind()).increment(1);

        match event {
            SensorEvent::Frames(frames) => Some(self.process_frames(&frames)),
            SensorEvent::Speech(speech) => self.process_speech(&speech),
        }
    }

    fn process_frames(&mut self, frames: &AllFramesReady) -> DuelUpdate {
        let mut out = FrameOutput::default();
        let format = self.config.color_format;
        let mapper = self.mapper.as_ref();

        if let Some(color) = &frames.color {
            out.meta.had_color = true;
            out.image = self.ingest.display_image(color);
            if let Some(image) = &out.image {
                self.state.set_image_source(image.info());
            }
        }

        let Some(skeleton_frame) = &frames.skeleton else {
            trace!("no skeleton frame");
            return self.finish(frames.timestamp, out);
        };
        out.meta.had_skeleton = true;

        let skeletons = self.ingest.copy_skeletons(skeleton_frame);
        let assignment = self.assigner.assign(skeletons);
        out.meta.tracked_skeletons = assignment.tracked;
        out.meta.player_ids = assignment.player_ids();

        let Some(player1) = assignment.player(PlayerSlot::One) else {
            counter!("lightsaber_engine_frames_skipped_total").increment(1);
            return self.finish(frames.timestamp, out);
        };

        out.scene.saber1 = self.geometry.segment(PlayerSlot::One, player1, mapper, format);
        if let Some(saber) = &out.scene.saber1 {
            if self.histories[0].observe(saber.tip.x) {
                out.sounds.push(SoundCue::Swing {
                    player: PlayerSlot::One,
                });
            }
            if self.state.hulk_mode() {
                out.scene.hulk = Some(self.geometry.hulk_overlay(player1, saber, mapper, format));
            }
        }

        self.state.set_game_mode(assignment.game_mode());

        if let Some(player2) = assignment.player(PlayerSlot::Two) {
            out.scene.saber2 = self.geometry.segment(PlayerSlot::Two, player2, mapper, format);
            if let Some(saber) = &out.scene.saber2 {
                if self.histories[1].observe(saber.tip.x) {
                    out.sounds.push(SoundCue::Swing {
                        player: PlayerSlot::Two,
                    });
                }
            }

            if let (Some(saber1), Some(saber2)) = (&out.scene.saber1, &out.scene.saber2) {
                if sabers_clash(saber1, saber2) {
                    debug!(tip1 = ?saber1.tip, tip2 = ?saber2.tip, "sabers clash");
                    out.sounds.push(SoundCue::Clash);
                    out.events.push(GameEvent::Clash);
                    self.histories.iter_mut().for_each(MotionHistory::clear);
                }
            }

            let struck = detect_hits(
                player1,
                player2,
                out.scene.saber1.as_ref(),
                out.scene.saber2.as_ref(),
                mapper,
                format,
                self.geometry.display_scale(),
            );
            self.referee
                .apply(struck, frames.timestamp, &mut self.state, &mut out.events);
        }

        self.finish(frames.timestamp, out)
    }

    fn process_speech(&mut self, speech: &SpeechResult) -> Option<DuelUpdate> {
        let Some(command) = self.interpreter.interpret(speech) else {
            debug!(text = %speech.text, confidence = speech.confidence, "speech ignored");
            return None;
        };

        match command {
            VoiceCommand::Hulk => {
                self.state.set_hulk_mode(true);
            }
            VoiceCommand::Smash => {
                self.state.set_message_color(StatusColor::Red);
            }
        }
        info!(command = command.as_str(), confidence = speech.confidence, "voice command");
        counter!("lightsaber_engine_voice_commands_total", "command" => command.as_str())
            .increment(1);

        let out = FrameOutput {
            events: vec![GameEvent::VoiceCommand {
                command: command.as_str().to_string(),
                confidence: speech.confidence,
            }],
            ..FrameOutput::default()
        };
        Some(self.finish(speech.timestamp, out))
    }

    fn finish(&mut self, timestamp: f64, out: FrameOutput) -> DuelUpdate {
        self.update_counter += 1;
        DuelUpdate {
            update_id: self.update_counter,
            timestamp,
            image: out.image,
            scene: out.scene,
            sounds: out.sounds,
            events: out.events,
            changes: self.state.take_changes(),
            state: self.state.snapshot(),
            meta: out.meta,
        }
    }
}

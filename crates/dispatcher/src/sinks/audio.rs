//! AudioSink - fire-and-forget sound cues

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{AudioConfig, ContractError, DataSink, DuelUpdate};
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::error::PlaybackError;

/// Audio output device
///
/// `play` must return immediately; overlapping cues are allowed.
pub trait SoundPlayer: Send {
    fn play(&mut self, asset: &str) -> Result<(), PlaybackError>;
}

/// Player that only logs the cue, for headless runs
#[derive(Debug, Clone, Default)]
pub struct LoggingPlayer {
    played: Arc<AtomicU64>,
}

impl LoggingPlayer {
    /// Cues played so far, shared across clones
    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

impl SoundPlayer for LoggingPlayer {
    fn play(&mut self, asset: &str) -> Result<(), PlaybackError> {
        self.played.fetch_add(1, Ordering::Relaxed);
        debug!(asset, "play");
        Ok(())
    }
}

/// Sink mapping the sound cues of each update to assets
pub struct AudioSink<P> {
    name: String,
    assets: AudioConfig,
    player: P,
}

impl<P: SoundPlayer> AudioSink<P> {
    pub fn new(name: impl Into<String>, assets: AudioConfig, player: P) -> Self {
        Self {
            name: name.into(),
            assets,
            player,
        }
    }

    /// `swing_asset` / `clash_asset` params override the configured assets
    pub fn from_params(
        name: impl Into<String>,
        assets: &AudioConfig,
        params: &HashMap<String, String>,
        player: P,
    ) -> Self {
        let mut assets = assets.clone();
        if let Some(swing) = params.get("swing_asset") {
            assets.swing_asset = swing.clone();
        }
        if let Some(clash) = params.get("clash_asset") {
            assets.clash_asset = clash.clone();
        }
        Self::new(name, assets, player)
    }

    pub fn assets(&self) -> &AudioConfig {
        &self.assets
    }
}

impl<P: SoundPlayer> DataSink for AudioSink<P> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "audio_sink_write",
        skip(self, update),
        fields(sink = %self.name, update_id = update.update_id)
    )]
    async fn write(&mut self, update: &DuelUpdate) -> Result<(), ContractError> {
        for cue in &update.sounds {
            let asset = self.assets.asset_for(*cue);
            self.player
                .play(asset)
                .map_err(|e| ContractError::playback(&self.name, asset, e.to_string()))?;
            counter!("lightsaber_sounds_played_total", "asset" => asset.to_string()).increment(1);
        }
        Ok(())
    }

    #[instrument(name = "audio_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "audio_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "AudioSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::update;
    use contracts::{PlayerSlot, SoundCue};

    /// Records assets, fails on a chosen one
    #[derive(Default)]
    struct RecordingPlayer {
        played: Vec<String>,
        broken: Option<String>,
    }

    impl SoundPlayer for RecordingPlayer {
        fn play(&mut self, asset: &str) -> Result<(), PlaybackError> {
            if self.broken.as_deref() == Some(asset) {
                return Err(PlaybackError::DeviceBusy);
            }
            self.played.push(asset.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn cues_map_to_assets() {
        let mut sink = AudioSink::new("speakers", AudioConfig::default(), RecordingPlayer::default());
        let mut update = update(1);
        update.sounds = vec![
            SoundCue::Swing {
                player: PlayerSlot::Two,
            },
            SoundCue::Clash,
        ];

        sink.write(&update).await.unwrap();
        assert_eq!(
            sink.player.played,
            vec!["Resources/lightsabre.wav", "Resources/clash.wav"]
        );
    }

    #[tokio::test]
    async fn params_override_assets() {
        let params = HashMap::from([("clash_asset".to_string(), "sfx/boom.wav".to_string())]);
        let sink = AudioSink::from_params(
            "speakers",
            &AudioConfig::default(),
            &params,
            LoggingPlayer::default(),
        );
        assert_eq!(sink.assets().clash_asset, "sfx/boom.wav");
        assert_eq!(sink.assets().swing_asset, "Resources/lightsabre.wav");
    }

    #[tokio::test]
    async fn playback_failure_names_the_asset() {
        let player = RecordingPlayer {
            broken: Some("Resources/clash.wav".into()),
            ..RecordingPlayer::default()
        };
        let mut sink = AudioSink::new("speakers", AudioConfig::default(), player);
        let mut update = update(3);
        update.sounds = vec![SoundCue::Clash];

        let err = sink.write(&update).await.unwrap_err();
        assert!(matches!(
            err,
            ContractError::Playback { asset, message, .. }
                if asset == "Resources/clash.wav" && message == "audio device busy"
        ));
    }

    #[tokio::test]
    async fn logging_player_counts_cues() {
        let player = LoggingPlayer::default();
        let mut sink = AudioSink::new("speakers", AudioConfig::default(), player.clone());
        let mut update = update(1);
        update.sounds = vec![SoundCue::Clash, SoundCue::Clash];

        sink.write(&update).await.unwrap();
        assert_eq!(player.played(), 2);
    }
}

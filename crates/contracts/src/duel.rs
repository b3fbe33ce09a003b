//! DuelUpdate - Duel Engine output
//!
//! Per-event game output: the saber scene, triggered sounds, game events and
//! the observable property changes to push to bound views.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ColorImageFormat, JointType};

/// Pixel position in the color image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPoint {
    pub x: i32,
    pub y: i32,
}

impl ColorPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Position on the display surface (Y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &DisplayPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Player slot in the duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn opponent(&self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// Player one always fights right-handed, player two left-handed
    pub fn fighting_hand(&self) -> FightingHand {
        match self {
            PlayerSlot::One => FightingHand::Right,
            PlayerSlot::Two => FightingHand::Left,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "player1"),
            PlayerSlot::Two => write!(f, "player2"),
        }
    }
}

/// Arm holding the saber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightingHand {
    Left,
    Right,
}

impl FightingHand {
    pub fn wrist(&self) -> JointType {
        match self {
            FightingHand::Left => JointType::WristLeft,
            FightingHand::Right => JointType::WristRight,
        }
    }

    pub fn elbow(&self) -> JointType {
        match self {
            FightingHand::Left => JointType::ElbowLeft,
            FightingHand::Right => JointType::ElbowRight,
        }
    }

    pub fn hand(&self) -> JointType {
        match self {
            FightingHand::Left => JointType::HandLeft,
            FightingHand::Right => JointType::HandRight,
        }
    }
}

/// Saber segment in display space, recomputed every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaberSegment {
    pub player: PlayerSlot,
    pub hand: FightingHand,

    /// Hilt anchor (scaled wrist/hand midpoint)
    pub hilt: DisplayPoint,

    /// Blade tip
    pub tip: DisplayPoint,

    /// Forearm angle after handedness correction, before the grip offset (degrees)
    pub forearm_angle_deg: f64,

    /// Final blade angle (degrees)
    pub blade_angle_deg: f64,
}

impl SaberSegment {
    pub fn length(&self) -> f64 {
        self.hilt.distance(&self.tip)
    }
}

/// Sprite placement (center + rotation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlacement {
    pub center: DisplayPoint,
    pub rotation_deg: f64,
}

/// Hulk mode overlays for player one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HulkOverlay {
    /// Hand sprite
    pub hand: OverlayPlacement,

    /// Head sprite center; `None` keeps the previous position
    pub head: Option<DisplayPoint>,
}

/// Drawable scene of one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelScene {
    pub saber1: Option<SaberSegment>,
    pub saber2: Option<SaberSegment>,
    pub hulk: Option<HulkOverlay>,
}

impl DuelScene {
    pub fn saber(&self, player: PlayerSlot) -> Option<&SaberSegment> {
        match player {
            PlayerSlot::One => self.saber1.as_ref(),
            PlayerSlot::Two => self.saber2.as_ref(),
        }
    }

    pub fn saber_count(&self) -> usize {
        usize::from(self.saber1.is_some()) + usize::from(self.saber2.is_some())
    }
}

/// Fire-and-forget sound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum SoundCue {
    /// Saber swing of one player
    Swing { player: PlayerSlot },
    /// Saber-on-saber clash
    Clash,
}

/// Discrete gameplay event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// Saber-on-saber contact
    Clash,
    /// Saber landed on a player; `strength` is what is left
    Hit { player: PlayerSlot, strength: i32 },
    /// A player dropped to zero; strengths are reset afterwards
    RoundWon { winner: PlayerSlot, wins: u32 },
    /// Accepted voice command
    VoiceCommand { command: String, confidence: f32 },
}

/// Color of the status message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    #[default]
    Default,
    Red,
}

/// Observable game properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Player1Strength,
    Player2Strength,
    Player1Wins,
    Player2Wins,
    GameMode,
    HulkMode,
    ImageSource,
    Message,
    MessageColor,
}

impl Property {
    pub fn strength_of(player: PlayerSlot) -> Property {
        match player {
            PlayerSlot::One => Property::Player1Strength,
            PlayerSlot::Two => Property::Player2Strength,
        }
    }

    pub fn wins_of(player: PlayerSlot) -> Property {
        match player {
            PlayerSlot::One => Property::Player1Wins,
            PlayerSlot::Two => Property::Player2Wins,
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Reference to the display image currently bound as image source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSourceInfo {
    pub frame_number: u64,
    pub width: u32,
    pub height: u32,
}

/// New value of an observable property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Flag(bool),
    Text(String),
    Color(StatusColor),
    Image(ImageSourceInfo),
}

/// Emitted only when a property's value actually changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub property: Property,
    pub value: PropertyValue,
}

/// Display-ready copy of a color frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayImage {
    pub frame_number: u64,
    pub format: ColorImageFormat,
    pub stride: usize,
    #[serde(skip)]
    pub pixels: Bytes,
}

impl DisplayImage {
    pub fn info(&self) -> ImageSourceInfo {
        ImageSourceInfo {
            frame_number: self.frame_number,
            width: self.format.width,
            height: self.format.height,
        }
    }
}

/// Snapshot of every observable value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub player1_strength: i32,
    pub player2_strength: i32,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub game_mode: bool,
    pub hulk_mode: bool,
    pub message: String,
    pub message_color: StatusColor,
}

impl GameStateSnapshot {
    pub fn strength(&self, player: PlayerSlot) -> i32 {
        match player {
            PlayerSlot::One => self.player1_strength,
            PlayerSlot::Two => self.player2_strength,
        }
    }

    pub fn wins(&self, player: PlayerSlot) -> u32 {
        match player {
            PlayerSlot::One => self.player1_wins,
            PlayerSlot::Two => self.player2_wins,
        }
    }
}

/// Diagnostics attached to each update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelMeta {
    /// Tracked skeletons in the frame (0 for speech events)
    pub tracked_skeletons: usize,

    /// Sensor tracking ids of player one / player two
    pub player_ids: [Option<u32>; 2],

    /// Whether a color frame was present
    pub had_color: bool,

    /// Whether a skeleton frame was present
    pub had_skeleton: bool,
}

/// Engine output for one sensor event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelUpdate {
    /// Sequence number (monotonically increasing)
    pub update_id: u64,

    /// Sensor clock (seconds)
    pub timestamp: f64,

    /// Display image produced by this event, if any
    #[serde(skip)]
    pub image: Option<DisplayImage>,

    /// Sabers and overlays to draw
    pub scene: DuelScene,

    /// Sounds to play
    pub sounds: Vec<SoundCue>,

    /// Gameplay events
    pub events: Vec<GameEvent>,

    /// Observable changes, in the order they happened
    pub changes: Vec<PropertyChange>,

    /// State after this event
    pub state: GameStateSnapshot,

    pub meta: DuelMeta,
}

//! Hit detection, per-player cooldown and round scoring.

use contracts::{
    ColorImageFormat, CoordinateMapper, GameEvent, JointType, PlayerSlot, SaberSegment, Skeleton,
};
use tracing::{debug, info};

use crate::state::ObservableState;

/// Which players the opposing saber struck this frame
///
/// Player one is struck when saber two's tip is left of player one's right
/// shoulder and below player one's head; player two mirrors with the left
/// shoulder. Requires both heads and both facing shoulders to be usable.
/// A missing saber only rules out the hit it would have dealt.
pub fn detect_hits(
    player1: &Skeleton,
    player2: &Skeleton,
    saber1: Option<&SaberSegment>,
    saber2: Option<&SaberSegment>,
    mapper: &dyn CoordinateMapper,
    format: ColorImageFormat,
    display_scale: f64,
) -> [bool; 2] {
    let p1_shoulder = player1.joint(JointType::ShoulderRight);
    let p1_head = player1.joint(JointType::Head);
    let p2_shoulder = player2.joint(JointType::ShoulderLeft);
    let p2_head = player2.joint(JointType::Head);

    if [p1_shoulder, p1_head, p2_shoulder, p2_head]
        .iter()
        .any(|joint| !joint.is_usable())
    {
        return [false, false];
    }

    let project = |position| {
        let point = mapper.map_skeleton_point_to_color_point(position, format);
        (
            display_scale * f64::from(point.x),
            display_scale * f64::from(point.y),
        )
    };

    let (p1_shoulder_x, _) = project(p1_shoulder.position);
    let (_, p1_head_y) = project(p1_head.position);
    let (p2_shoulder_x, _) = project(p2_shoulder.position);
    let (_, p2_head_y) = project(p2_head.position);

    [
        saber2.is_some_and(|saber| saber.tip.x < p1_shoulder_x && saber.tip.y > p1_head_y),
        saber1.is_some_and(|saber| saber.tip.x > p2_shoulder_x && saber.tip.y > p2_head_y),
    ]
}

/// Applies hits to strengths and settles rounds
#[derive(Debug, Clone)]
pub struct HitReferee {
    cooldown_s: f64,
    starting_strength: i32,
    /// Sensor time of the last counted hit per player
    last_hit: [Option<f64>; 2],
}

impl HitReferee {
    pub fn new(cooldown_s: f64, starting_strength: i32) -> Self {
        Self {
            cooldown_s,
            starting_strength,
            last_hit: [None, None],
        }
    }

    /// A player never hit before can always be hit
    pub fn cooldown_elapsed(&self, player: PlayerSlot, now: f64) -> bool {
        self.last_hit[player.index()].map_or(true, |last| now - last >= self.cooldown_s)
    }

    /// Apply this frame's hits, then end the round if a player is down
    pub fn apply(
        &mut self,
        struck: [bool; 2],
        now: f64,
        state: &mut ObservableState,
        events: &mut Vec<GameEvent>,
    ) {
        for player in PlayerSlot::BOTH {
            if !struck[player.index()] {
                continue;
            }
            if !self.cooldown_elapsed(player, now) {
                debug!(%player, now, "hit ignored during cooldown");
                continue;
            }

            let strength = state.strength(player) - 1;
            state.set_strength(player, strength);
            self.last_hit[player.index()] = Some(now);
            debug!(%player, strength, "player hit");
            events.push(GameEvent::Hit { player, strength });
        }

        self.settle_round(state, events);
    }

    fn settle_round(&self, state: &mut ObservableState, events: &mut Vec<GameEvent>) {
        let p1 = state.strength(PlayerSlot::One);
        let p2 = state.strength(PlayerSlot::Two);
        if p1 > 0 && p2 > 0 {
            return;
        }

        // ties go to player two
        let winner = if p1 > p2 {
            PlayerSlot::One
        } else {
            PlayerSlot::Two
        };
        let wins = state.wins(winner) + 1;
        state.set_wins(winner, wins);
        info!(%winner, wins, "round won");
        events.push(GameEvent::RoundWon { winner, wins });

        for player in PlayerSlot::BOTH {
            state.set_strength(player, self.starting_strength);
        }
    }
}

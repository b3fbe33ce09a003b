//! Synthetic duel choreography
//!
//! Two fencers facing each other in front of the sensor. Player one stands on
//! the image's left and swings the right arm, player two mirrors with the left
//! arm. Forearm angles oscillate so sabers periodically cross and land below
//! the opponent's head. Pure function of time, so frames are reproducible.

use std::f32::consts::TAU;

use contracts::{JointType, Skeleton, SkeletonPoint};

/// Distance of both players from the sensor (meters)
const STAGE_DEPTH: f32 = 2.5;
/// Horizontal offset of each player's spine from the image center (meters)
const STAGE_HALF_WIDTH: f32 = 0.6;
const SHOULDER_HALF_WIDTH: f32 = 0.17;
const UPPER_ARM: f32 = 0.26;
const FOREARM: f32 = 0.25;
const PALM: f32 = 0.08;

/// Parameters of one fencer's swing
#[derive(Debug, Clone, Copy)]
struct Swing {
    period_s: f32,
    phase: f32,
    /// Center of the forearm angle oscillation (degrees, 0 = pointing at the opponent)
    center_deg: f32,
    amplitude_deg: f32,
}

/// Deterministic two-player duel generator
#[derive(Debug, Clone)]
pub struct DuelChoreography {
    players: usize,
    slots: usize,
}

impl DuelChoreography {
    /// Tracking ids handed out to the synthetic players
    pub const TRACKING_IDS: [u32; 2] = [101, 202];

    /// Slot index of each synthetic player; the first slot stays empty like a real sensor
    pub const PLAYER_SLOTS: [usize; 2] = [1, 3];

    pub fn new(players: usize, slots: usize) -> Self {
        Self {
            players: players.min(2),
            slots: slots.max(Self::PLAYER_SLOTS[1] + 1),
        }
    }

    /// Skeleton array at time `t` (seconds since start)
    pub fn skeletons_at(&self, t: f64) -> Vec<Skeleton> {
        let mut skeletons = vec![Skeleton::default(); self.slots];
        let t = t as f32;

        if self.players >= 1 {
            let swing = Swing {
                period_s: 1.6,
                phase: 0.0,
                center_deg: -15.0,
                amplitude_deg: 55.0,
            };
            skeletons[Self::PLAYER_SLOTS[0]] = fencer(Self::TRACKING_IDS[0], -1.0, swing, t);
        }
        if self.players >= 2 {
            let swing = Swing {
                period_s: 2.3,
                phase: 0.25,
                center_deg: -10.0,
                amplitude_deg: 50.0,
            };
            skeletons[Self::PLAYER_SLOTS[1]] = fencer(Self::TRACKING_IDS[1], 1.0, swing, t);
        }

        skeletons
    }
}

/// Build one fencer. `side` is -1 for the left fencer (right arm forward)
/// and +1 for the right fencer (left arm forward).
fn fencer(tracking_id: u32, side: f32, swing: Swing, t: f32) -> Skeleton {
    let spine_x = side * STAGE_HALF_WIDTH;
    // lunge toward the opponent every few seconds
    let lunge = 0.12 * (TAU * (t / 4.0 + swing.phase)).sin().max(0.0);
    let center_x = spine_x - side * lunge;
    let z = STAGE_DEPTH;

    let inner_x = center_x - side * SHOULDER_HALF_WIDTH;
    let outer_x = center_x + side * SHOULDER_HALF_WIDTH;

    let (front_shoulder, back_shoulder, elbow, wrist, hand) = if side < 0.0 {
        (
            JointType::ShoulderRight,
            JointType::ShoulderLeft,
            JointType::ElbowRight,
            JointType::WristRight,
            JointType::HandRight,
        )
    } else {
        (
            JointType::ShoulderLeft,
            JointType::ShoulderRight,
            JointType::ElbowLeft,
            JointType::WristLeft,
            JointType::HandLeft,
        )
    };

    let angle_deg = swing.center_deg
        + swing.amplitude_deg * (TAU * (t / swing.period_s + swing.phase)).sin();
    let angle = angle_deg.to_radians();
    // forearm direction points at the opponent (-side in x)
    let dir_x = -side * angle.cos();
    let dir_y = angle.sin();

    let shoulder_y = 0.45;
    let elbow_pos = SkeletonPoint::new(inner_x - side * 0.05, shoulder_y - UPPER_ARM, z);
    let wrist_pos = SkeletonPoint::new(
        elbow_pos.x + dir_x * FOREARM,
        elbow_pos.y + dir_y * FOREARM,
        z - 0.1,
    );
    let hand_pos = SkeletonPoint::new(
        wrist_pos.x + dir_x * PALM,
        wrist_pos.y + dir_y * PALM,
        z - 0.12,
    );

    Skeleton::tracked(tracking_id)
        .with_joint(JointType::HipCenter, SkeletonPoint::new(center_x, -0.1, z))
        .with_joint(JointType::Spine, SkeletonPoint::new(center_x, 0.05, z))
        .with_joint(JointType::ShoulderCenter, SkeletonPoint::new(center_x, shoulder_y, z))
        .with_joint(JointType::Head, SkeletonPoint::new(center_x, 0.68, z))
        .with_joint(front_shoulder, SkeletonPoint::new(inner_x, shoulder_y, z))
        .with_joint(back_shoulder, SkeletonPoint::new(outer_x, shoulder_y, z))
        .with_joint(elbow, elbow_pos)
        .with_joint(wrist, wrist_pos)
        .with_joint(hand, hand_pos)
}

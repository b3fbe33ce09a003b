//! Skeleton - body tracking data model
//!
//! Twenty named joints per skeleton, each with a 3-D position and a tracking state.

use serde::{Deserialize, Serialize};

/// 3-D joint position in sensor space (meters)
///
/// `x` grows toward the right edge of the color image, `y` grows upward, `z` is the
/// distance from the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SkeletonPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Body part identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    HipCenter,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

impl JointType {
    /// All joints in sensor order
    pub const ALL: [JointType; 20] = [
        JointType::HipCenter,
        JointType::Spine,
        JointType::ShoulderCenter,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
    ];
}

/// Per-joint tracking quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointTrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

/// Single body joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub joint_type: JointType,
    pub position: SkeletonPoint,
    #[serde(default)]
    pub tracking_state: JointTrackingState,
}

impl Joint {
    pub fn tracked(joint_type: JointType, position: SkeletonPoint) -> Self {
        Self {
            joint_type,
            position,
            tracking_state: JointTrackingState::Tracked,
        }
    }

    pub fn not_tracked(joint_type: JointType) -> Self {
        Self {
            joint_type,
            position: SkeletonPoint::default(),
            tracking_state: JointTrackingState::NotTracked,
        }
    }

    /// Inferred joints still count as usable
    pub fn is_usable(&self) -> bool {
        self.tracking_state != JointTrackingState::NotTracked
    }
}

/// Skeleton-level tracking state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonTrackingState {
    #[default]
    NotTracked,
    PositionOnly,
    Tracked,
}

/// One slot of the sensor's skeleton array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Sensor-assigned identity, stable while the body stays in view
    #[serde(default)]
    pub tracking_id: u32,

    #[serde(default)]
    pub tracking_state: SkeletonTrackingState,

    /// Joints reported for this skeleton; absent joints read as not tracked
    #[serde(default)]
    pub joints: Vec<Joint>,
}

impl Skeleton {
    /// Create a fully tracked skeleton without joints
    pub fn tracked(tracking_id: u32) -> Self {
        Self {
            tracking_id,
            tracking_state: SkeletonTrackingState::Tracked,
            joints: Vec::with_capacity(JointType::ALL.len()),
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state == SkeletonTrackingState::Tracked
    }

    /// Look up a joint, falling back to a not-tracked joint
    pub fn joint(&self, joint_type: JointType) -> Joint {
        self.joints
            .iter()
            .find(|joint| joint.joint_type == joint_type)
            .copied()
            .unwrap_or_else(|| Joint::not_tracked(joint_type))
    }

    /// Insert or replace a joint
    pub fn set_joint(&mut self, joint: Joint) {
        match self
            .joints
            .iter_mut()
            .find(|existing| existing.joint_type == joint.joint_type)
        {
            Some(existing) => *existing = joint,
            None => self.joints.push(joint),
        }
    }

    /// Builder-style variant of [`Skeleton::set_joint`] for tracked joints
    pub fn with_joint(mut self, joint_type: JointType, position: SkeletonPoint) -> Self {
        self.set_joint(Joint::tracked(joint_type, position));
        self
    }
}

//! Saber geometry: forearm angle, grip offset and blade segment.
//!
//! All outputs are in display space (color pixels times the display scale,
//! Y growing downward).

use contracts::{
    ColorImageFormat, ColorPoint, CoordinateMapper, DisplayPoint, DuelEngineConfig, FightingHand,
    HulkOverlay, JointType, OverlayPlacement, PlayerSlot, SaberSegment, Skeleton,
};
use nalgebra::{Point2, Vector2};

/// Blade construction parameters
#[derive(Debug, Clone, Copy)]
pub struct SaberGeometry {
    blade_length: f64,
    grip_offset_deg: f64,
    display_scale: f64,
}

impl SaberGeometry {
    pub fn new(blade_length: f64, grip_offset_deg: f64, display_scale: f64) -> Self {
        Self {
            blade_length,
            grip_offset_deg,
            display_scale,
        }
    }

    pub fn from_config(config: &DuelEngineConfig) -> Self {
        Self::new(
            config.blade_length,
            config.grip_offset_deg,
            config.display_scale,
        )
    }

    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    /// Forearm angle from the projected wrist and elbow (degrees, ±90)
    ///
    /// Zero when the forearm is vertical in the image.
    pub fn raw_forearm_angle(wrist: ColorPoint, elbow: ColorPoint) -> f64 {
        if wrist.x == elbow.x {
            return 0.0;
        }
        let rise = f64::from(elbow.y - wrist.y);
        let run = f64::from(wrist.x - elbow.x);
        (rise / run).atan().to_degrees()
    }

    /// Forearm angle with the handedness half-plane applied
    ///
    /// Keeps the blade pointing away from the body whatever the arm orientation.
    pub fn forearm_angle(wrist: ColorPoint, elbow: ColorPoint, hand: FightingHand) -> f64 {
        let raw = Self::raw_forearm_angle(wrist, elbow);
        let flip = match hand {
            FightingHand::Right => wrist.x < elbow.x,
            FightingHand::Left => wrist.x < elbow.x || wrist.y > elbow.y,
        };
        if flip {
            raw + 180.0
        } else {
            raw
        }
    }

    /// Blade angle after the grip offset
    pub fn blade_angle(&self, forearm_angle_deg: f64, hand: FightingHand) -> f64 {
        match hand {
            FightingHand::Left => forearm_angle_deg - self.grip_offset_deg,
            FightingHand::Right => forearm_angle_deg + self.grip_offset_deg,
        }
    }

    /// Scale a color pixel into display space
    pub fn to_display(&self, point: ColorPoint) -> DisplayPoint {
        DisplayPoint::new(
            self.display_scale * f64::from(point.x),
            self.display_scale * f64::from(point.y),
        )
    }

    /// Hilt anchor: scaled midpoint of wrist and hand
    pub fn hilt(&self, wrist: ColorPoint, hand: ColorPoint) -> DisplayPoint {
        let wrist = Point2::new(f64::from(wrist.x), f64::from(wrist.y));
        let hand = Point2::new(f64::from(hand.x), f64::from(hand.y));
        let anchor = nalgebra::center(&wrist, &hand) * self.display_scale;
        DisplayPoint::new(anchor.x, anchor.y)
    }

    /// Blade tip at `blade_angle_deg` from the hilt
    pub fn tip(&self, hilt: DisplayPoint, blade_angle_deg: f64) -> DisplayPoint {
        let radians = blade_angle_deg.to_radians();
        // screen Y grows downward
        let direction = Vector2::new(radians.cos(), -radians.sin());
        let tip = Point2::new(hilt.x, hilt.y) + direction * self.blade_length;
        DisplayPoint::new(tip.x, tip.y)
    }

    /// Saber of `player`, or `None` when wrist, elbow or hand is not tracked
    pub fn segment(
        &self,
        player: PlayerSlot,
        skeleton: &Skeleton,
        mapper: &dyn CoordinateMapper,
        format: ColorImageFormat,
    ) -> Option<SaberSegment> {
        let hand = player.fighting_hand();
        let joints = [hand.wrist(), hand.elbow(), hand.hand()].map(|j| skeleton.joint(j));
        if joints.iter().any(|joint| !joint.is_usable()) {
            return None;
        }

        let [wrist, elbow, palm] =
            joints.map(|joint| mapper.map_skeleton_point_to_color_point(joint.position, format));

        let forearm_angle_deg = Self::forearm_angle(wrist, elbow, hand);
        let blade_angle_deg = self.blade_angle(forearm_angle_deg, hand);
        let hilt = self.hilt(wrist, palm);

        Some(SaberSegment {
            player,
            hand,
            hilt,
            tip: self.tip(hilt, blade_angle_deg),
            forearm_angle_deg,
            blade_angle_deg,
        })
    }

    /// Glove and head sprites of hulk mode
    ///
    /// The glove turns by `360 - forearm angle`, its rest orientation differs
    /// from the blade's. The head sprite only moves while the head is usable.
    pub fn hulk_overlay(
        &self,
        skeleton: &Skeleton,
        saber: &SaberSegment,
        mapper: &dyn CoordinateMapper,
        format: ColorImageFormat,
    ) -> HulkOverlay {
        let palm = skeleton.joint(saber.hand.hand());
        let palm = mapper.map_skeleton_point_to_color_point(palm.position, format);

        let head = skeleton.joint(JointType::Head);
        let head = head.is_usable().then(|| {
            self.to_display(mapper.map_skeleton_point_to_color_point(head.position, format))
        });

        HulkOverlay {
            hand: OverlayPlacement {
                center: self.to_display(palm),
                rotation_deg: 360.0 - saber.forearm_angle_deg,
            },
            head,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Joint, JointTrackingState, SkeletonPoint, DEFAULT_BLADE_LENGTH};
    use rand::Rng;

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

    fn geometry() -> SaberGeometry {
        SaberGeometry::from_config(&DuelEngineConfig::default())
    }

    fn arm(hand: FightingHand, wrist: (f32, f32), elbow: (f32, f32), palm: (f32, f32)) -> Skeleton {
        Skeleton::tracked(1)
            .with_joint(hand.wrist(), SkeletonPoint::new(wrist.0, wrist.1, 2.0))
            .with_joint(hand.elbow(), SkeletonPoint::new(elbow.0, elbow.1, 2.0))
            .with_joint(hand.hand(), SkeletonPoint::new(palm.0, palm.1, 2.0))
    }

    #[test]
    fn vertical_forearm_has_zero_raw_angle() {
        let angle =
            SaberGeometry::raw_forearm_angle(ColorPoint::new(100, 300), ColorPoint::new(100, 200));
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn right_arm_pointing_left_flips_half_plane() {
        let wrist = ColorPoint::new(200, 200);
        let elbow = ColorPoint::new(250, 180);
        let raw = SaberGeometry::raw_forearm_angle(wrist, elbow);
        let corrected = SaberGeometry::forearm_angle(wrist, elbow, FightingHand::Right);
        assert!((corrected - raw - 180.0).abs() < 1e-9);
    }

    #[test]
    fn left_arm_with_wrist_below_elbow_flips_half_plane() {
        let wrist = ColorPoint::new(300, 260);
        let elbow = ColorPoint::new(250, 200);
        let raw = SaberGeometry::raw_forearm_angle(wrist, elbow);
        let left = SaberGeometry::forearm_angle(wrist, elbow, FightingHand::Left);
        assert!((left - raw - 180.0).abs() < 1e-9);

        // same pose on the right arm keeps the raw angle
        assert_eq!(SaberGeometry::forearm_angle(wrist, elbow, FightingHand::Right), raw);
    }

    #[test]
    fn grip_offset_sign_follows_handedness() {
        let geometry = geometry();
        assert_eq!(geometry.blade_angle(10.0, FightingHand::Right), 55.0);
        assert_eq!(geometry.blade_angle(10.0, FightingHand::Left), -35.0);
    }

    #[test]
    fn right_arm_segment() {
        let skeleton = arm(FightingHand::Right, (300.0, 200.0), (250.0, 180.0), (320.0, 210.0));
        let saber = geometry()
            .segment(PlayerSlot::One, &skeleton, &PixelMapper, ColorImageFormat::default())
            .unwrap();

        let expected_forearm = (-20.0f64 / 50.0).atan().to_degrees();
        assert!((saber.forearm_angle_deg - expected_forearm).abs() < 1e-9);
        assert!((saber.blade_angle_deg - (expected_forearm + 45.0)).abs() < 1e-9);
        assert_eq!(saber.hilt, DisplayPoint::new(620.0, 410.0));

        let radians = saber.blade_angle_deg.to_radians();
        assert!((saber.tip.x - (620.0 + 350.0 * radians.cos())).abs() < 1e-9);
        assert!((saber.tip.y - (410.0 - 350.0 * radians.sin())).abs() < 1e-9);
    }

    #[test]
    fn untracked_joint_yields_no_saber() {
        let mut skeleton = arm(FightingHand::Left, (300.0, 200.0), (250.0, 180.0), (320.0, 210.0));
        skeleton.set_joint(Joint::not_tracked(JointType::ElbowLeft));

        let saber =
            geometry().segment(PlayerSlot::Two, &skeleton, &PixelMapper, ColorImageFormat::default());
        assert!(saber.is_none());
    }

    #[test]
    fn inferred_joints_still_draw_a_saber() {
        let mut skeleton = arm(FightingHand::Right, (300.0, 200.0), (250.0, 180.0), (320.0, 210.0));
        for joint_type in [JointType::WristRight, JointType::ElbowRight, JointType::HandRight] {
            let mut joint = skeleton.joint(joint_type);
            joint.tracking_state = JointTrackingState::Inferred;
            skeleton.set_joint(joint);
        }

        let saber =
            geometry().segment(PlayerSlot::One, &skeleton, &PixelMapper, ColorImageFormat::default());
        assert_eq!(saber.map(|s| s.hilt), Some(DisplayPoint::new(620.0, 410.0)));
    }

    #[test]
    fn blade_length_is_constant_for_any_pose() {
        let geometry = geometry();
        let mut rng = rand::rng();

        for _ in 0..500 {
            let mut point = || (rng.random_range(0.0..640.0f32), rng.random_range(0.0..480.0f32));
            let (wrist, elbow, palm) = (point(), point(), point());

            for player in PlayerSlot::BOTH {
                let skeleton = arm(player.fighting_hand(), wrist, elbow, palm);
                let saber = geometry
                    .segment(player, &skeleton, &PixelMapper, ColorImageFormat::default())
                    .unwrap();
                assert!((saber.length() - DEFAULT_BLADE_LENGTH).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn hulk_overlay_rotates_inverse_of_forearm() {
        let geometry = geometry();
        let skeleton = arm(FightingHand::Right, (300.0, 200.0), (250.0, 180.0), (320.0, 210.0))
            .with_joint(JointType::Head, SkeletonPoint::new(280.0, 100.0, 2.0));
        let saber = geometry
            .segment(PlayerSlot::One, &skeleton, &PixelMapper, ColorImageFormat::default())
            .unwrap();

        let overlay =
            geometry.hulk_overlay(&skeleton, &saber, &PixelMapper, ColorImageFormat::default());
        assert_eq!(overlay.hand.center, DisplayPoint::new(640.0, 420.0));
        assert!((overlay.hand.rotation_deg - (360.0 - saber.forearm_angle_deg)).abs() < 1e-9);
        assert_eq!(overlay.head, Some(DisplayPoint::new(560.0, 200.0)));

        let mut headless = skeleton.clone();
        headless.set_joint(Joint::not_tracked(JointType::Head));
        let overlay =
            geometry.hulk_overlay(&headless, &saber, &PixelMapper, ColorImageFormat::default());
        assert!(overlay.head.is_none());
    }
}

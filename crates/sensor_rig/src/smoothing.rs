//! Skeleton smoothing
//!
//! Holt double exponential filter applied per joint, driven by the
//! `SmoothingParameters` the skeleton stream is enabled with. Joints that lose
//! tracking reset their filter state; skeletons are keyed by tracking id.

use std::collections::HashMap;

use contracts::{JointType, Skeleton, SkeletonPoint, SmoothingParameters};
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy)]
struct JointFilterState {
    raw: Vector3<f32>,
    filtered: Vector3<f32>,
    trend: Vector3<f32>,
    frames_seen: u32,
}

/// Stateful joint smoother for one skeleton stream
#[derive(Debug)]
pub struct JointSmoother {
    params: SmoothingParameters,
    states: HashMap<(u32, JointType), JointFilterState>,
}

impl JointSmoother {
    pub fn new(params: SmoothingParameters) -> Self {
        Self {
            params,
            states: HashMap::new(),
        }
    }

    pub fn params(&self) -> &SmoothingParameters {
        &self.params
    }

    /// Smooth every tracked joint of every tracked skeleton in place
    pub fn apply(&mut self, skeletons: &mut [Skeleton]) {
        let live: Vec<u32> = skeletons
            .iter()
            .filter(|skeleton| skeleton.is_tracked())
            .map(|skeleton| skeleton.tracking_id)
            .collect();
        self.states.retain(|(id, _), _| live.contains(id));

        for skeleton in skeletons.iter_mut().filter(|s| s.is_tracked()) {
            let tracking_id = skeleton.tracking_id;
            for joint in skeleton.joints.iter_mut() {
                let key = (tracking_id, joint.joint_type);
                if !joint.is_usable() {
                    self.states.remove(&key);
                    continue;
                }
                joint.position = self.filter(key, joint.position);
            }
        }
    }

    fn filter(&mut self, key: (u32, JointType), point: SkeletonPoint) -> SkeletonPoint {
        let p = &self.params;
        let raw = Vector3::new(point.x, point.y, point.z);

        let previous = self.states.get(&key).copied();
        let (filtered, trend, frames_seen) = match previous {
            None => (raw, Vector3::zeros(), 1),
            Some(prev) if prev.frames_seen == 1 => {
                let filtered = (raw + prev.raw) * 0.5;
                let diff = filtered - prev.filtered;
                let trend = diff * p.correction + prev.trend * (1.0 - p.correction);
                (filtered, trend, 2)
            }
            Some(prev) => {
                let diff = raw - prev.filtered;
                let len = diff.norm();
                let raw = if len <= p.jitter_radius && p.jitter_radius > 0.0 {
                    let blend = len / p.jitter_radius;
                    raw * blend + prev.filtered * (1.0 - blend)
                } else {
                    raw
                };

                let filtered =
                    raw * (1.0 - p.smoothing) + (prev.filtered + prev.trend) * p.smoothing;
                let diff = filtered - prev.filtered;
                let trend = diff * p.correction + prev.trend * (1.0 - p.correction);
                (filtered, trend, prev.frames_seen.saturating_add(1))
            }
        };

        let mut predicted = filtered + trend * p.prediction;
        let deviation = (predicted - raw).norm();
        if deviation > p.max_deviation_radius && deviation > 0.0 {
            let blend = p.max_deviation_radius / deviation;
            predicted = predicted * blend + raw * (1.0 - blend);
        }

        self.states.insert(
            key,
            JointFilterState {
                raw,
                filtered,
                trend,
                frames_seen,
            },
        );

        SkeletonPoint::new(predicted.x, predicted.y, predicted.z)
    }
}

//! Pinhole projection from skeleton space to color pixels.

use contracts::{ColorImageFormat, ColorPoint, CoordinateMapper, SkeletonPoint};
use nalgebra::{Matrix3, Vector3};

/// Color camera focal length at 640 pixels of width
pub const NOMINAL_FOCAL_LENGTH_PX: f64 = 531.15;

/// Points closer than this (meters) project onto the principal point
const MIN_DEPTH_M: f64 = 1e-3;

/// Uncalibrated pinhole model of the color camera
///
/// Focal length scales with the image width, the principal point sits at the
/// image center. Image `v` grows downward while skeleton `y` grows upward.
#[derive(Debug, Clone, Copy)]
pub struct PinholeMapper {
    focal_length_px: f64,
}

impl Default for PinholeMapper {
    fn default() -> Self {
        Self::new(NOMINAL_FOCAL_LENGTH_PX)
    }
}

impl PinholeMapper {
    /// `focal_length_px` is given for a 640 pixel wide image
    pub fn new(focal_length_px: f64) -> Self {
        Self { focal_length_px }
    }

    /// Camera matrix for `format`
    #[rustfmt::skip]
    pub fn intrinsics(&self, format: ColorImageFormat) -> Matrix3<f64> {
        let width = f64::from(format.width);
        let height = f64::from(format.height);
        let f = self.focal_length_px * width / 640.0;

        Matrix3::new(
            f, 0.0, width / 2.0,
            0.0, f, height / 2.0,
            0.0, 0.0, 1.0,
        )
    }
}

impl CoordinateMapper for PinholeMapper {
    fn map_skeleton_point_to_color_point(
        &self,
        point: SkeletonPoint,
        format: ColorImageFormat,
    ) -> ColorPoint {
        let k = self.intrinsics(format);
        let z = f64::from(point.z);

        let normalized = if z < MIN_DEPTH_M {
            Vector3::new(0.0, 0.0, 1.0)
        } else {
            Vector3::new(f64::from(point.x) / z, -f64::from(point.y) / z, 1.0)
        };

        let pixel = k * normalized;
        ColorPoint::new(pixel.x.round() as i32, pixel.y.round() as i32)
    }
}

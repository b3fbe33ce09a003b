//! Frame ingest: color frame copy and reusable skeleton buffer.

use contracts::{ColorFrame, DisplayImage, Skeleton, SkeletonFrame};
use tracing::{debug, warn};

/// Per-engine frame buffers
#[derive(Debug, Default)]
pub struct FrameIngest {
    /// Sized on the first skeleton frame, overwritten afterwards
    skeletons: Vec<Skeleton>,
    sized: bool,
}

impl FrameIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the display image of a color frame
    ///
    /// Returns `None` when the pixel buffer does not match the declared format.
    /// An empty buffer is accepted (sources that skip pixel payloads).
    pub fn display_image(&self, frame: &ColorFrame) -> Option<DisplayImage> {
        let stride = frame.format.width as usize * frame.pixel_format.bytes_per_pixel();
        let expected = stride * frame.format.height as usize;

        if !frame.pixels.is_empty() && frame.pixels.len() != expected {
            warn!(
                frame_number = frame.frame_number,
                expected,
                actual = frame.pixels.len(),
                "color frame size mismatch, image skipped"
            );
            metrics::counter!("lightsaber_engine_color_frames_rejected_total").increment(1);
            return None;
        }

        Some(DisplayImage {
            frame_number: frame.frame_number,
            format: frame.format,
            stride,
            // pixel buffers are immutable, sharing replaces the copy
            pixels: frame.pixels.clone(),
        })
    }

    /// Copy the skeleton array into the reusable buffer
    pub fn copy_skeletons(&mut self, frame: &SkeletonFrame) -> &[Skeleton] {
        if !self.sized {
            self.skeletons = vec![Skeleton::default(); frame.skeletons.len()];
            self.sized = true;
            debug!(slots = frame.skeletons.len(), "skeleton buffer allocated");
        }

        if self.skeletons.len() != frame.skeletons.len() {
            // array length changed mid-session
            self.skeletons.resize(frame.skeletons.len(), Skeleton::default());
        }
        self.skeletons.clone_from_slice(&frame.skeletons);
        &self.skeletons
    }

    pub fn skeletons(&self) -> &[Skeleton] {
        &self.skeletons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ColorImageFormat, PixelFormat};

    fn color(format: ColorImageFormat, len: usize) -> ColorFrame {
        ColorFrame {
            timestamp: 0.0,
            frame_number: 9,
            format,
            pixel_format: PixelFormat::Bgr32,
            pixels: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn stride_is_four_bytes_per_pixel() {
        let ingest = FrameIngest::new();
        let format = ColorImageFormat::RGB_640X480_FPS30;
        let image = ingest
            .display_image(&color(format, format.frame_len()))
            .unwrap();

        assert_eq!(image.stride, 640 * 4);
        assert_eq!(image.pixels.len(), 640 * 480 * 4);
        assert_eq!(image.info().frame_number, 9);
    }

    #[test]
    fn truncated_color_frame_is_rejected() {
        let ingest = FrameIngest::new();
        let format = ColorImageFormat::RGB_640X480_FPS30;
        assert!(ingest.display_image(&color(format, 100)).is_none());
        assert!(ingest.display_image(&color(format, 0)).is_some());
    }

    #[test]
    fn skeleton_buffer_is_reused() {
        let mut ingest = FrameIngest::new();
        let mut frame = SkeletonFrame {
            timestamp: 0.0,
            frame_number: 0,
            skeletons: vec![Skeleton::default(); 6],
        };
        frame.skeletons[2] = Skeleton::tracked(5);

        let copied = ingest.copy_skeletons(&frame);
        assert_eq!(copied.len(), 6);
        assert!(copied[2].is_tracked());

        frame.skeletons[2] = Skeleton::default();
        frame.skeletons[4] = Skeleton::tracked(8);
        let copied = ingest.copy_skeletons(&frame);
        assert!(!copied[2].is_tracked());
        assert_eq!(copied[4].tracking_id, 8);
        assert_eq!(ingest.skeletons().len(), 6);
    }
}

//! Mock sensor implementation
//!
//! Implements `FrameSource`, generates a synthetic two-player duel.
//! Used for testing and development without sensor hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use bytes::Bytes;
use contracts::{
    AllFramesReady, ColorFrame, ColorImageFormat, FrameCallback, FrameSource, MockSensorConfig,
    PixelFormat, SkeletonFrame, SmoothingParameters,
};
use tracing::{debug, trace};

use crate::choreography::DuelChoreography;
use crate::smoothing::JointSmoother;

/// One BGR32 pixel as laid out in the color stream
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Bgr32 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub unused: u8,
}

/// Mock sensor
///
/// Produces frames in a background thread at the color format's frame rate.
/// Timestamps follow the frame counter (`frame_number / fps`), not the wall clock.
pub struct MockSensor {
    source_id: String,
    color_format: ColorImageFormat,
    smoothing: SmoothingParameters,
    skeleton_slots: usize,
    config: MockSensorConfig,
    listening: Arc<AtomicBool>,
}

impl MockSensor {
    /// Create new Mock sensor
    pub fn new(
        source_id: impl Into<String>,
        color_format: ColorImageFormat,
        smoothing: SmoothingParameters,
        skeleton_slots: usize,
        config: MockSensorConfig,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            color_format,
            smoothing,
            skeleton_slots,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create Mock sensor with default configuration
    pub fn with_defaults(source_id: impl Into<String>) -> Self {
        Self::new(
            source_id,
            ColorImageFormat::default(),
            SmoothingParameters::default(),
            6,
            MockSensorConfig::default(),
        )
    }

    /// Render a flat backdrop whose tint drifts with the frame number
    fn render_backdrop(format: ColorImageFormat, frame_number: u64) -> Bytes {
        let shade = (frame_number % 64) as u8;
        let pixel = Bgr32 {
            b: 40 + shade,
            g: 24,
            r: 16,
            unused: 0,
        };
        let pixels = vec![pixel; format.width as usize * format.height as usize];
        Bytes::copy_from_slice(bytemuck::cast_slice(&pixels))
    }

    /// Build the frame set for one tick
    fn build_frames(
        choreography: &DuelChoreography,
        smoother: &mut JointSmoother,
        format: ColorImageFormat,
        include_pixels: bool,
        frame_number: u64,
    ) -> AllFramesReady {
        let timestamp = frame_number as f64 * format.frame_interval();

        let mut skeletons = choreography.skeletons_at(timestamp);
        smoother.apply(&mut skeletons);

        let pixels = if include_pixels {
            Self::render_backdrop(format, frame_number)
        } else {
            Bytes::new()
        };

        AllFramesReady {
            timestamp,
            color: Some(ColorFrame {
                timestamp,
                frame_number,
                format,
                pixel_format: PixelFormat::Bgr32,
                pixels,
            }),
            skeleton: Some(SkeletonFrame {
                timestamp,
                frame_number,
                skeletons,
            }),
        }
    }
}

impl FrameSource for MockSensor {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn color_format(&self) -> ColorImageFormat {
        self.color_format
    }

    fn listen(&self, callback: FrameCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let format = self.color_format;
        let config = self.config.clone();
        let listening = self.listening.clone();
        let choreography = DuelChoreography::new(config.players, self.skeleton_slots);
        let mut smoother = JointSmoother::new(self.smoothing);

        let interval = Duration::from_secs_f64(format.frame_interval());

        thread::spawn(move || {
            let mut frame_number: u64 = 0;

            debug!(
                source_id = %source_id,
                width = format.width,
                height = format.height,
                fps = format.fps,
                players = config.players,
                "mock sensor started"
            );

            while listening.load(Ordering::Relaxed) {
                if config.frame_limit.is_some_and(|limit| frame_number >= limit) {
                    debug!(source_id = %source_id, frame_number, "mock frame limit reached");
                    listening.store(false, Ordering::SeqCst);
                    break;
                }

                let frames = Self::build_frames(
                    &choreography,
                    &mut smoother,
                    format,
                    config.include_pixels,
                    frame_number,
                );
                let timestamp = frames.timestamp;
                callback(frames);

                trace!(
                    source_id = %source_id,
                    frame_number,
                    timestamp,
                    "mock frames sent"
                );

                frame_number += 1;
                thread::sleep(interval);
            }

            debug!(source_id = %source_id, "mock sensor stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex;

    fn fast_sensor(frame_limit: Option<u64>, include_pixels: bool) -> MockSensor {
        MockSensor::new(
            "test_kinect",
            ColorImageFormat {
                width: 32,
                height: 24,
                fps: 200,
            },
            SmoothingParameters::default(),
            6,
            MockSensorConfig {
                players: 2,
                frame_limit,
                include_pixels,
            },
        )
    }

    #[test]
    fn test_mock_sensor_frames() {
        let sensor = fast_sensor(None, true);
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        sensor.listen(Arc::new(move |frames| {
            received_clone.lock().unwrap().push(frames);
        }));

        thread::sleep(Duration::from_millis(50));
        sensor.stop();

        let frames = received.lock().unwrap();
        assert!(!frames.is_empty());
        let first = &frames[0];
        let color = first.color.as_ref().unwrap();
        assert_eq!(color.pixels.len(), 32 * 24 * 4);
        let skeleton = first.skeleton.as_ref().unwrap();
        assert_eq!(skeleton.skeletons.len(), 6);
        assert_eq!(skeleton.skeletons.iter().filter(|s| s.is_tracked()).count(), 2);
        assert!(!sensor.is_listening());
    }

    #[test]
    fn test_mock_sensor_timestamps_follow_frame_rate() {
        let sensor = fast_sensor(Some(3), false);
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        sensor.listen(Arc::new(move |frames| {
            received_clone.lock().unwrap().push(frames.timestamp);
        }));

        thread::sleep(Duration::from_millis(100));

        let timestamps = received.lock().unwrap();
        assert_eq!(timestamps.len(), 3);
        assert!((timestamps[2] - 2.0 / 200.0).abs() < 1e-9);
        assert!(!sensor.is_listening());
    }

    #[test]
    fn test_mock_sensor_idempotent_listen() {
        let sensor = fast_sensor(Some(5), false);

        let count = Arc::new(AtomicU64::new(0));
        let count1 = count.clone();
        let count2 = count.clone();

        sensor.listen(Arc::new(move |_| {
            count1.fetch_add(1, Ordering::Relaxed);
        }));

        // Second call should be ignored
        sensor.listen(Arc::new(move |_| {
            count2.fetch_add(100, Ordering::Relaxed);
        }));

        thread::sleep(Duration::from_millis(100));
        sensor.stop();

        assert_eq!(count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_backdrop_is_bgr32() {
        let format = ColorImageFormat {
            width: 4,
            height: 2,
            fps: 30,
        };
        let bytes = MockSensor::render_backdrop(format, 1);
        assert_eq!(bytes.len(), format.frame_len());
        let pixels: &[Bgr32] = bytemuck::cast_slice(&bytes[..]);
        assert_eq!(pixels[0].b, 41);
        assert_eq!(pixels[0].unused, 0);
    }
}

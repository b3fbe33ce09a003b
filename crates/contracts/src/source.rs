//! FrameSource / SpeechSource traits - sensor backend abstraction
//!
//! Defines the callback-driven interface the ingestion pipeline consumes,
//! decoupling it from the concrete sensor backends (synthetic, replay, hardware).

use std::sync::Arc;

use crate::{
    AllFramesReady, ColorImageFormat, ColorPoint, RecognizerInfo, SkeletonPoint, SpeechResult,
};

/// Frame callback type
///
/// Uses `Arc` to allow callback sharing across the producer thread and the pipeline.
pub type FrameCallback = Arc<dyn Fn(AllFramesReady) + Send + Sync>;

/// Speech callback type
pub type SpeechCallback = Arc<dyn Fn(SpeechResult) + Send + Sync>;

/// Color + skeleton frame source
///
/// Mock, replay and hardware sensors share this API. Repeated `listen` calls while
/// already listening are idempotent (no second callback is registered).
///
/// # Example
///
/// ```ignore
/// let sensor: Box<dyn FrameSource> = rig.frame_source();
/// sensor.listen(Arc::new(|frames| {
///     println!("frames at {}", frames.timestamp);
/// }));
/// sensor.stop();
/// ```
pub trait FrameSource: Send + Sync {
    /// Source identifier (logging/metrics)
    fn source_id(&self) -> &str;

    /// Color stream format the source was opened with
    fn color_format(&self) -> ColorImageFormat;

    /// Register the frame callback and start producing
    fn listen(&self, callback: FrameCallback);

    /// Stop producing frames
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

/// Speech recognition source bound to a closed vocabulary
pub trait SpeechSource: Send + Sync {
    /// Source identifier (logging/metrics)
    fn source_id(&self) -> &str;

    /// Recognizer the source was built with
    fn recognizer(&self) -> &RecognizerInfo;

    /// Register the recognition callback and start recognizing
    fn listen(&self, callback: SpeechCallback);

    /// Stop recognizing
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

/// Projection from sensor space to color image pixels
pub trait CoordinateMapper: Send + Sync {
    /// Map a 3-D joint position to a pixel of an image in `format`
    fn map_skeleton_point_to_color_point(
        &self,
        point: SkeletonPoint,
        format: ColorImageFormat,
    ) -> ColorPoint;
}

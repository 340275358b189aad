//! Frame-sampled video processing.
//!
//! Container demuxing and frame decoding sit behind the [`FrameSource`]
//! seam (decode is sequential and forward-only; no seeking), and annotated
//! output behind [`FrameRenderer`]. This module owns the sampling policy
//! and per-file label aggregation.

mod sequence;

pub use sequence::ImageSequenceSource;

use crate::constants::video::{FALLBACK_FPS, FRAME_INTERVAL_SECS};
use crate::detector::{Detection, ImageDetector};
use crate::error::Result;
use image::RgbImage;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Sequential source of decoded video frames.
pub trait FrameSource {
    /// Source frame rate, if the container reports one.
    fn frame_rate(&self) -> Option<f32>;

    /// Decode the next frame. `None` means end of stream; an `Err` item is
    /// a single undecodable frame, not the end of the file.
    fn next_frame(&mut self) -> Option<Result<RgbImage>>;
}

/// External renderer for annotated video output.
///
/// Invoked with every frame in order; `detections` is empty for frames that
/// were not sampled for inference.
pub trait FrameRenderer {
    /// Write one annotated frame.
    fn render(&mut self, frame: &RgbImage, detections: &[Detection]) -> Result<()>;
}

/// Frames between inference runs for a given source frame rate.
///
/// `round(fps * interval_secs)`, clamped to at least 1. An unreported or
/// zero frame rate falls back to a fixed constant.
pub fn sample_interval(fps: Option<f32>) -> usize {
    let fps = match fps {
        Some(f) if f > 0.0 => f,
        _ => FALLBACK_FPS,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let interval = (fps * FRAME_INTERVAL_SECS).round() as usize;
    interval.max(1)
}

/// Statistics from one video pass.
#[derive(Debug, Default)]
pub struct VideoStats {
    /// Frames read from the source.
    pub frames_read: usize,
    /// Frames submitted to the detector.
    pub frames_sampled: usize,
    /// Frames that failed to decode or infer and were skipped.
    pub frames_failed: usize,
}

/// Outcome of sampling one video.
#[derive(Debug)]
pub struct VideoOutcome {
    /// Distinct labels seen across all sampled frames.
    pub labels: BTreeSet<String>,
    /// Pass statistics.
    pub stats: VideoStats,
}

/// Run the detector over sampled frames and union the resulting labels.
///
/// Per-frame decode or inference failures are logged and skipped; only the
/// renderer (when present) can fail the whole pass, since a broken annotated
/// output is not recoverable.
pub fn process_video(
    detector: &ImageDetector<'_>,
    source: &mut dyn FrameSource,
    mut renderer: Option<&mut dyn FrameRenderer>,
) -> Result<VideoOutcome> {
    let interval = sample_interval(source.frame_rate());
    debug!(interval, "sampling one frame per interval");

    let mut labels = BTreeSet::new();
    let mut stats = VideoStats::default();
    let mut frame_index = 0usize;

    while let Some(frame) = source.next_frame() {
        let index = frame_index;
        frame_index += 1;
        stats.frames_read += 1;

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(frame = index, "failed to decode frame, skipping: {e}");
                stats.frames_failed += 1;
                continue;
            }
        };

        let detections = if index % interval == 0 {
            stats.frames_sampled += 1;
            match detector.detect(&image::DynamicImage::ImageRgb8(frame.clone())) {
                Ok(detections) => {
                    labels.extend(detections.iter().map(|d| d.label.clone()));
                    detections
                }
                Err(e) => {
                    warn!(frame = index, "inference failed on frame, skipping: {e}");
                    stats.frames_failed += 1;
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        if let Some(renderer) = renderer.as_deref_mut() {
            renderer.render(&frame, &detections)?;
        }
    }

    debug!(
        read = stats.frames_read,
        sampled = stats.frames_sampled,
        failed = stats.frames_failed,
        species = labels.len(),
        "video pass complete"
    );

    Ok(VideoOutcome { labels, stats })
}

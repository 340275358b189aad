//! Fixed-length audio segmentation.

use crate::constants::audio::{MIN_TAIL_FRACTION, SEGMENT_LENGTH_SECS};
use tracing::debug;

/// Split a mono waveform into fixed-length classification segments.
///
/// Windows of `SEGMENT_LENGTH_SECS * sample_rate` samples are cut forward
/// with no overlap. Full windows are kept as-is. A trailing window is kept
/// only when it is longer than half a segment, in which case it is
/// zero-padded on the right to full length; shorter tails are discarded so
/// near-empty fragments are never classified.
pub fn segment_samples(samples: &[f32], sample_rate: u32) -> Vec<Vec<f32>> {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let segment_samples = (SEGMENT_LENGTH_SECS * sample_rate as f32) as usize;
    if segment_samples == 0 {
        return Vec::new();
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let min_tail = (segment_samples as f32 * MIN_TAIL_FRACTION) as usize;

    let mut segments = Vec::with_capacity(samples.len() / segment_samples + 1);
    for window in samples.chunks(segment_samples) {
        if window.len() == segment_samples {
            segments.push(window.to_vec());
        } else if window.len() > min_tail {
            let mut padded = window.to_vec();
            padded.resize(segment_samples, 0.0);
            segments.push(padded);
        } else {
            debug!(
                tail_samples = window.len(),
                "discarding trailing fragment below half segment"
            );
        }
    }

    segments
}

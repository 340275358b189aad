//! Image/frame object detector.
//!
//! Preprocesses an image to the model's fixed square input, decodes the raw
//! candidate tensor, applies the confidence threshold and hands survivors to
//! non-maximum suppression. Bounding boxes leave this module in the original
//! image's pixel space.

use crate::constants::detector as defaults;
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, nms_indices};
use crate::inference::DetectionModel;
use image::DynamicImage;
use ndarray::{Array4, ArrayView2, Axis};
use serde::Serialize;
use tracing::debug;

/// One detected object in original-image pixel coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Index into the class label list.
    pub class_id: usize,
    /// Class label.
    pub label: String,
    /// Confidence score in `[0, 1]`.
    pub confidence: f32,
    /// Bounding box in original-image pixels.
    pub bbox: BoundingBox,
}

/// Detector tuning parameters.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Square model input resolution.
    pub input_size: u32,
    /// Minimum confidence for a candidate to survive decoding.
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: defaults::INPUT_SIZE,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            iou_threshold: defaults::IOU_THRESHOLD,
        }
    }
}

/// Object detector over a [`DetectionModel`] and its label list.
pub struct ImageDetector<'a> {
    model: &'a dyn DetectionModel,
    labels: &'a [String],
    config: DetectorConfig,
}

impl<'a> ImageDetector<'a> {
    /// Create a detector with default thresholds.
    pub fn new(model: &'a dyn DetectionModel, labels: &'a [String]) -> Self {
        Self::with_config(model, labels, DetectorConfig::default())
    }

    /// Create a detector with explicit configuration.
    pub const fn with_config(
        model: &'a dyn DetectionModel,
        labels: &'a [String],
        config: DetectorConfig,
    ) -> Self {
        Self {
            model,
            labels,
            config,
        }
    }

    /// Run detection on one image.
    ///
    /// Returns an empty vector (not an error) when no candidate clears the
    /// confidence threshold.
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (orig_w, orig_h) = (image.width(), image.height());
        let input = preprocess(image, self.config.input_size);

        let output = self.model.infer(input.view())?;
        let features = output.shape()[1];
        if features < 5 {
            return Err(Error::OutputShape {
                expected: "[1, 4 + num_classes, num_candidates]".to_string(),
                got: format!("{:?}", output.shape()),
            });
        }

        // [1, F, N] -> candidate-major [N, F].
        let batch = output.index_axis(Axis(0), 0);
        let candidates = batch.t();

        let decoded = decode_candidates(
            candidates,
            orig_w,
            orig_h,
            self.labels,
            &self.config,
        );
        debug!(
            candidates = decoded.len(),
            "decoded candidates above threshold"
        );

        Ok(suppress(decoded, self.config.iou_threshold))
    }
}

/// Stretch-resize to the square model input and normalize to a
/// `[1, 3, S, S]` NCHW tensor with values in `[0, 1]`.
///
/// Aspect ratio is deliberately not preserved; the decoder compensates with
/// independent horizontal and vertical rescale factors.
pub fn preprocess(image: &DynamicImage, input_size: u32) -> Array4<f32> {
    let resized = image
        .resize_exact(input_size, input_size, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = f32::from(pixel[0]) / 255.0;
        tensor[[0, 1, y, x]] = f32::from(pixel[1]) / 255.0;
        tensor[[0, 2, y, x]] = f32::from(pixel[2]) / 255.0;
    }
    tensor
}

/// Decode candidate rows `[xc, yc, w, h, score_0, .., score_C]` into typed
/// detections in original-image pixel space.
///
/// Candidates at or below the confidence threshold are dropped, as are
/// candidates whose argmax class falls outside the label list.
pub fn decode_candidates(
    candidates: ArrayView2<'_, f32>,
    orig_w: u32,
    orig_h: u32,
    labels: &[String],
    config: &DetectorConfig,
) -> Vec<Detection> {
    #[allow(clippy::cast_precision_loss)]
    let input_size = config.input_size as f32;
    #[allow(clippy::cast_precision_loss)]
    let scale_x = orig_w as f32 / input_size;
    #[allow(clippy::cast_precision_loss)]
    let scale_y = orig_h as f32 / input_size;

    let mut detections = Vec::new();
    for row in candidates.rows() {
        let scores = &row.as_slice().map_or_else(
            || row.iter().copied().collect::<Vec<f32>>(),
            <[f32]>::to_vec,
        )[4..];

        let (class_id, confidence) = scores.iter().enumerate().fold(
            (0usize, f32::NEG_INFINITY),
            |(best, best_score), (idx, &score)| {
                if score > best_score {
                    (idx, score)
                } else {
                    (best, best_score)
                }
            },
        );

        if confidence <= config.confidence_threshold || !confidence.is_finite() {
            continue;
        }
        if class_id >= labels.len() {
            continue;
        }

        let (xc, yc, w, h) = (row[0], row[1], row[2], row[3]);
        let bbox = BoundingBox::new(
            (xc - w / 2.0) * scale_x,
            (yc - h / 2.0) * scale_y,
            (xc + w / 2.0) * scale_x,
            (yc + h / 2.0) * scale_y,
        );

        detections.push(Detection {
            class_id,
            label: labels[class_id].clone(),
            confidence,
            bbox,
        });
    }

    detections
}

/// Apply greedy non-maximum suppression to typed detections.
///
/// Survivors come back in descending confidence order; ties keep their
/// input order.
pub fn suppress(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let boxed: Vec<(BoundingBox, f32)> =
        detections.iter().map(|d| (d.bbox, d.confidence)).collect();
    let kept = nms_indices(&boxed, iou_threshold);

    let mut slots: Vec<Option<Detection>> = detections.into_iter().map(Some).collect();
    kept.into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

//! Per-segment audio classification and cross-segment ranking.

use crate::audio::segment_samples;
use crate::constants::audio as defaults;
use crate::error::Result;
use crate::inference::AudioModel;
use serde::Serialize;
use tracing::{debug, warn};

/// One species prediction for a single audio segment.
#[derive(Debug, Clone, Serialize)]
pub struct AudioPrediction {
    /// Raw model label.
    pub species: String,
    /// Prediction confidence.
    pub confidence: f32,
    /// Zero-based segment index within the file.
    #[serde(rename = "segment")]
    pub segment_index: usize,
    /// Segment start time in seconds.
    pub timestamp: f32,
}

/// Audio classifier tuning parameters.
#[derive(Debug, Clone, Copy)]
pub struct AudioClassifierConfig {
    /// Minimum confidence for a prediction to be emitted.
    pub confidence_threshold: f32,
    /// Top-scoring classes considered per segment.
    pub top_k: usize,
    /// Segment length in seconds (drives prediction timestamps).
    pub segment_length_secs: f32,
}

impl Default for AudioClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            top_k: defaults::TOP_K,
            segment_length_secs: defaults::SEGMENT_LENGTH_SECS,
        }
    }
}

/// Species classifier over an [`AudioModel`] and its label list.
pub struct AudioClassifier<'a> {
    model: &'a dyn AudioModel,
    labels: &'a [String],
    config: AudioClassifierConfig,
}

impl<'a> AudioClassifier<'a> {
    /// Create a classifier with default thresholds.
    pub fn new(model: &'a dyn AudioModel, labels: &'a [String]) -> Self {
        Self::with_config(model, labels, AudioClassifierConfig::default())
    }

    /// Create a classifier with explicit configuration.
    pub const fn with_config(
        model: &'a dyn AudioModel,
        labels: &'a [String],
        config: AudioClassifierConfig,
    ) -> Self {
        Self {
            model,
            labels,
            config,
        }
    }

    /// Classify a mono waveform already at the model's sample rate.
    ///
    /// Segments the waveform, runs per-segment inference, keeps the top-k
    /// classes above the confidence threshold per segment, and returns all
    /// predictions ranked by confidence descending (stable on ties). A
    /// single segment's inference failure is logged and skipped; it never
    /// fails the rest of the file.
    pub fn classify(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<AudioPrediction>> {
        let segments = segment_samples(samples, sample_rate);
        debug!(segments = segments.len(), "classifying audio segments");

        let mut predictions = Vec::new();
        for (segment_index, segment) in segments.iter().enumerate() {
            match self.model.infer(segment) {
                Ok(scores) => {
                    predictions.extend(self.segment_predictions(&scores, segment_index));
                }
                Err(e) => {
                    warn!(segment = segment_index, "segment inference failed, skipping: {e}");
                }
            }
        }

        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(predictions)
    }

    /// Top-k classes of one score vector, thresholded into predictions.
    fn segment_predictions(
        &self,
        scores: &[f32],
        segment_index: usize,
    ) -> Vec<AudioPrediction> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        #[allow(clippy::cast_precision_loss)]
        let timestamp = segment_index as f32 * self.config.segment_length_secs;

        order
            .into_iter()
            .take(self.config.top_k)
            .filter(|&idx| scores[idx] > self.config.confidence_threshold)
            .map(|idx| AudioPrediction {
                species: self
                    .labels
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| format!("Unknown_{idx}")),
                confidence: scores[idx],
                segment_index,
                timestamp,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Model replaying one score vector per segment, in order.
    struct Scripted {
        responses: Vec<Result<Vec<f32>>>,
        next: AtomicUsize,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Vec<f32>>>) -> Self {
            Self {
                responses,
                next: AtomicUsize::new(0),
            }
        }
    }

    impl AudioModel for Scripted {
        fn infer(&self, _segment: &[f32]) -> Result<Vec<f32>> {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            match &self.responses[i] {
                Ok(v) => Ok(v.clone()),
                Err(_) => Err(Error::Inference {
                    reason: "scripted failure".to_string(),
                }),
            }
        }
    }

    fn labels() -> Vec<String> {
        (0..8).map(|i| format!("Species_{i}")).collect()
    }

    fn six_seconds() -> Vec<f32> {
        vec![0.1; 288_000] // 6 s at 48 kHz -> 2 segments
    }

    #[test]
    fn test_top_k_and_threshold() {
        // Eight classes; only the top five are considered and of those only
        // scores above 0.1 survive.
        let scores = vec![0.9, 0.05, 0.5, 0.3, 0.2, 0.15, 0.02, 0.01];
        let model = Scripted::new(vec![Ok(scores), Ok(vec![0.0; 8])]);
        let labels = labels();
        let classifier = AudioClassifier::new(&model, &labels);

        let predictions = classifier.classify(&six_seconds(), 48_000).unwrap();

        let species: Vec<&str> = predictions.iter().map(|p| p.species.as_str()).collect();
        assert_eq!(
            species,
            vec!["Species_0", "Species_2", "Species_3", "Species_4", "Species_5"]
        );
        assert_eq!(predictions[0].confidence, 0.9);
    }

    #[test]
    fn test_timestamps_follow_segment_index() {
        let scores = vec![0.8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let model = Scripted::new(vec![Ok(scores.clone()), Ok(scores)]);
        let labels = labels();
        let classifier = AudioClassifier::new(&model, &labels);

        let mut predictions = classifier.classify(&six_seconds(), 48_000).unwrap();
        predictions.sort_by_key(|p| p.segment_index);

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].timestamp, 0.0);
        assert_eq!(predictions[1].timestamp, 3.0);
    }

    #[test]
    fn test_segment_failure_is_isolated() {
        let good = vec![0.7, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let model = Scripted::new(vec![
            Err(Error::Inference {
                reason: "boom".to_string(),
            }),
            Ok(good),
        ]);
        let labels = labels();
        let classifier = AudioClassifier::new(&model, &labels);

        let predictions = classifier.classify(&six_seconds(), 48_000).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].segment_index, 1);
    }

    #[test]
    fn test_ranking_is_global_across_segments() {
        let first = vec![0.3, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let second = vec![0.0, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let model = Scripted::new(vec![Ok(first), Ok(second)]);
        let labels = labels();
        let classifier = AudioClassifier::new(&model, &labels);

        let predictions = classifier.classify(&six_seconds(), 48_000).unwrap();
        assert_eq!(predictions[0].species, "Species_1");
        assert_eq!(predictions[0].segment_index, 1);
        assert_eq!(predictions[1].species, "Species_0");
    }

    #[test]
    fn test_unknown_index_gets_placeholder_label() {
        // Score vector longer than the label list.
        let mut scores = vec![0.0; 10];
        scores[9] = 0.8;
        let model = Scripted::new(vec![Ok(scores), Ok(vec![0.0; 10])]);
        let labels = labels(); // 8 labels
        let classifier = AudioClassifier::new(&model, &labels);

        let predictions = classifier.classify(&six_seconds(), 48_000).unwrap();
        assert_eq!(predictions[0].species, "Unknown_9");
    }
}

//! Per-file analysis pipeline.
//!
//! Dispatches media to the matching analyzer, reduces raw model labels to
//! the recognized species vocabulary and produces [`DetectionRecord`]s.
//! Files where nothing recognizable was found produce no record at all.

use crate::audio::{
    AudioClassifier, AudioClassifierConfig, AudioPrediction, decode_audio_file, resample,
};
use crate::constants::audio::{MAX_PREDICTIONS, SAMPLE_RATE};
use crate::constants::PREDICTIONS_SUFFIX;
use crate::detector::{Detection, ImageDetector};
use crate::error::{Error, Result};
use crate::inference::AudioModel;
use crate::labels::simplify_species;
use crate::media::MediaType;
use crate::store::{DetectionRecord, SpeciesCount};
use crate::video::{FrameRenderer, FrameSource, process_video};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reduce per-detection labels to recognized species with summed counts.
///
/// Each detection contributes 1 to its simplified species; detections whose
/// label reduces to nothing are dropped.
#[must_use]
pub fn summarize_detections(detections: &[Detection]) -> Vec<SpeciesCount> {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    for detection in detections {
        if let Some(species) = simplify_species(&detection.label) {
            *counts.entry(species).or_insert(0) += 1;
        }
    }
    into_species_counts(counts)
}

/// Reduce distinct labels (video frames, audio predictions) to recognized
/// species, each with a count of 1.
#[must_use]
pub fn summarize_presence<'a, I>(labels: I) -> Vec<SpeciesCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    for label in labels {
        if let Some(species) = simplify_species(label) {
            counts.entry(species).or_insert(1);
        }
    }
    into_species_counts(counts)
}

fn into_species_counts(counts: BTreeMap<&'static str, u32>) -> Vec<SpeciesCount> {
    counts
        .into_iter()
        .map(|(label, count)| SpeciesCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn record_if_recognized(
    media_type: MediaType,
    original_url: &str,
    detected_birds: Vec<SpeciesCount>,
) -> Option<DetectionRecord> {
    if detected_birds.is_empty() {
        info!(file = original_url, "no recognized species, skipping record");
        return None;
    }
    Some(DetectionRecord::new(media_type, original_url, detected_birds))
}

/// Analyze one image file.
///
/// Returns the record, or `None` when no recognized species was detected.
pub fn analyze_image(detector: &ImageDetector<'_>, path: &Path) -> Result<Option<DetectionRecord>> {
    let image = image::open(path).map_err(|e| Error::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let detections = detector.detect(&image)?;
    debug!(file = %path.display(), detections = detections.len(), "image analyzed");

    let summary = summarize_detections(&detections);
    Ok(record_if_recognized(
        MediaType::Image,
        &path.display().to_string(),
        summary,
    ))
}

/// Analyze one video via its frame source.
///
/// Species seen in any sampled frame are recorded with a count of 1; frame
/// counts are deliberately not accumulated across a video.
pub fn analyze_video(
    detector: &ImageDetector<'_>,
    source: &mut dyn FrameSource,
    renderer: Option<&mut dyn FrameRenderer>,
    original_url: &str,
) -> Result<Option<DetectionRecord>> {
    let outcome = process_video(detector, source, renderer)?;
    let summary = summarize_presence(outcome.labels.iter().map(String::as_str));
    Ok(record_if_recognized(MediaType::Video, original_url, summary))
}

/// Result of analyzing one audio file.
#[derive(Debug)]
pub struct AudioAnalysis {
    /// Ranked predictions, at most the global maximum.
    pub predictions: Vec<AudioPrediction>,
    /// Record for the store, when any recognized species was heard.
    pub record: Option<DetectionRecord>,
    /// Path of the written predictions sidecar, when one was written.
    pub sidecar: Option<PathBuf>,
}

/// Analyze one audio file.
///
/// Decodes, resamples to the model rate, classifies, keeps the top ranked
/// predictions and (optionally) writes them next to the source file as
/// `<stem>_predictions.json`.
pub fn analyze_audio(
    model: &dyn AudioModel,
    labels: &[String],
    path: &Path,
    config: AudioClassifierConfig,
    write_sidecar: bool,
) -> Result<AudioAnalysis> {
    let decoded = decode_audio_file(path)?;
    debug!(
        file = %path.display(),
        sample_rate = decoded.sample_rate,
        duration_secs = decoded.duration_secs,
        "audio decoded"
    );

    let samples = resample(decoded.samples, decoded.sample_rate, SAMPLE_RATE)?;

    let classifier = AudioClassifier::with_config(model, labels, config);
    let mut predictions = classifier.classify(&samples, SAMPLE_RATE)?;
    predictions.truncate(MAX_PREDICTIONS);

    let sidecar = if write_sidecar {
        Some(write_predictions(path, &predictions)?)
    } else {
        None
    };

    let summary = summarize_presence(predictions.iter().map(|p| p.species.as_str()));
    let record = record_if_recognized(MediaType::Audio, &path.display().to_string(), summary);

    Ok(AudioAnalysis {
        predictions,
        record,
        sidecar,
    })
}

/// Write ranked predictions next to the source file.
fn write_predictions(source: &Path, predictions: &[AudioPrediction]) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let sidecar = source.with_file_name(format!("{stem}{PREDICTIONS_SUFFIX}"));

    let json = serde_json::to_string_pretty(predictions).map_err(|e| Error::JsonWrite {
        path: sidecar.clone(),
        source: e,
    })?;
    fs::write(&sidecar, json)?;

    info!(path = %sidecar.display(), "wrote predictions");
    Ok(sidecar)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn detection(label: &str) -> Detection {
        Detection {
            class_id: 0,
            label: label.to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    #[test]
    fn test_summarize_detections_sums_per_species() {
        let detections = vec![
            detection("Crow"),
            detection("Crow"),
            detection("Pigeon"),
            detection("Airplane"),
        ];
        let summary = summarize_detections(&detections);
        assert_eq!(
            summary,
            vec![
                SpeciesCount {
                    label: "Crow".to_string(),
                    count: 2
                },
                SpeciesCount {
                    label: "Pigeon".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_summarize_presence_counts_once() {
        let labels = ["Corvus_corone_Crow", "Athene_noctua_Owl", "Unknown_9"];
        let summary = summarize_presence(labels.iter().copied());
        assert_eq!(
            summary,
            vec![
                SpeciesCount {
                    label: "Crow".to_string(),
                    count: 1
                },
                SpeciesCount {
                    label: "Owl".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_unrecognized_only_yields_no_record() {
        let summary = summarize_detections(&[detection("Airplane"), detection("Kite")]);
        assert!(summary.is_empty());
        assert!(record_if_recognized(MediaType::Image, "x.jpg", summary).is_none());
    }
}

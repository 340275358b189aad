//! Configuration type definitions.

use crate::constants::{audio, detector};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configured models.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Default settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// The model slots: one image/frame detector and one audio classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Object detector for images and video frames.
    pub detector: Option<ModelConfig>,

    /// Audio event classifier.
    pub audio: Option<ModelConfig>,
}

/// Configuration for a single model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,

    /// Path to the labels file.
    pub labels: PathBuf,
}

/// Default analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Minimum confidence for image/frame detections.
    pub detector_confidence: f32,

    /// Minimum confidence for audio predictions.
    pub audio_confidence: f32,

    /// Record store file. Defaults to the platform data directory.
    pub store: Option<PathBuf>,

    /// Write per-file audio prediction sidecars.
    pub write_predictions: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            detector_confidence: detector::CONFIDENCE_THRESHOLD,
            audio_confidence: audio::CONFIDENCE_THRESHOLD,
            store: None,
            write_predictions: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.models.detector.is_none());
        assert!(config.models.audio.is_none());
        assert_eq!(config.defaults.detector_confidence, 0.5);
        assert_eq!(config.defaults.audio_confidence, 0.1);
        assert!(config.defaults.write_predictions);
    }
}

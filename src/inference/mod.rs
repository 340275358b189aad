//! Inference abstractions and the process-wide model context.
//!
//! The algorithmic pipelines depend only on the narrow [`DetectionModel`]
//! and [`AudioModel`] traits; the ONNX Runtime sessions implementing them
//! live in [`session`].

mod session;

pub use session::{OrtAudioModel, OrtDetectionModel};

use crate::config::{Config, validate_model_config};
use crate::error::{Error, Result};
use crate::labels::load_labels;
use ndarray::{Array3, ArrayView4};
use std::sync::{Mutex, OnceLock};
use tracing::info;

/// Object-detection model taking a `[1, 3, S, S]` image tensor and
/// returning raw candidates shaped `[1, 4 + num_classes, num_candidates]`.
pub trait DetectionModel: Send + Sync {
    /// Run inference on a preprocessed image tensor.
    fn infer(&self, input: ArrayView4<'_, f32>) -> Result<Array3<f32>>;
}

/// Audio classification model taking one fixed-length mono segment and
/// returning a per-class score vector.
pub trait AudioModel: Send + Sync {
    /// Run inference on a single audio segment.
    fn infer(&self, segment: &[f32]) -> Result<Vec<f32>>;
}

/// A loaded detection model with its ordered class labels.
pub struct LoadedDetector {
    /// The model session.
    pub model: Box<dyn DetectionModel>,
    /// Ordered class labels.
    pub labels: Vec<String>,
}

/// A loaded audio model with its ordered class labels.
pub struct LoadedAudioModel {
    /// The model session.
    pub model: Box<dyn AudioModel>,
    /// Ordered class labels.
    pub labels: Vec<String>,
}

/// Lazily loaded, process-wide model handles.
///
/// Models configured in the config file are loaded on first use and cached
/// for the lifetime of the process. Either slot may be absent when the
/// corresponding model is not configured.
pub struct ModelContext {
    /// Image/frame detector, if configured.
    pub detector: Option<LoadedDetector>,
    /// Audio classifier, if configured.
    pub audio: Option<LoadedAudioModel>,
}

static CONTEXT: OnceLock<ModelContext> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

impl ModelContext {
    /// Load all configured models, validating their files first.
    pub fn load(config: &Config) -> Result<Self> {
        let detector = config
            .models
            .detector
            .as_ref()
            .map(|mc| {
                validate_model_config(mc)?;
                info!("Loading detection model: {}", mc.path.display());
                Ok::<_, Error>(LoadedDetector {
                    model: Box::new(OrtDetectionModel::from_file(&mc.path)?)
                        as Box<dyn DetectionModel>,
                    labels: load_labels(&mc.labels)?,
                })
            })
            .transpose()?;

        let audio = config
            .models
            .audio
            .as_ref()
            .map(|mc| {
                validate_model_config(mc)?;
                info!("Loading audio model: {}", mc.path.display());
                Ok::<_, Error>(LoadedAudioModel {
                    model: Box::new(OrtAudioModel::from_file(&mc.path)?) as Box<dyn AudioModel>,
                    labels: load_labels(&mc.labels)?,
                })
            })
            .transpose()?;

        Ok(Self { detector, audio })
    }

    /// Get the process-wide context, loading models on first call.
    ///
    /// Initialization is serialized behind a lock, so concurrent first
    /// calls load the models exactly once; a failed load releases the lock
    /// and the next caller retries.
    pub fn global(config: &Config) -> Result<&'static Self> {
        if let Some(ctx) = CONTEXT.get() {
            return Ok(ctx);
        }

        let _guard = INIT.lock().map_err(|_| Error::Internal {
            message: "model context init lock poisoned".to_string(),
        })?;
        if let Some(ctx) = CONTEXT.get() {
            return Ok(ctx);
        }

        let built = Self::load(config)?;
        Ok(CONTEXT.get_or_init(|| built))
    }

    /// The detector slot, or a config error naming what is missing.
    pub fn require_detector(&self) -> Result<&LoadedDetector> {
        self.detector.as_ref().ok_or_else(|| Error::ConfigValidation {
            message: "no detection model configured (set [models.detector] in config)".to_string(),
        })
    }

    /// The audio slot, or a config error naming what is missing.
    pub fn require_audio(&self) -> Result<&LoadedAudioModel> {
        self.audio.as_ref().ok_or_else(|| Error::ConfigValidation {
            message: "no audio model configured (set [models.audio] in config)".to_string(),
        })
    }
}

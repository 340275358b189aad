//! ONNX Runtime session wrappers.
//!
//! Sessions are guarded by a mutex so a model handle can be shared across
//! threads; inference within one process is serialized per session.

use crate::error::{Error, Result};
use crate::inference::{AudioModel, DetectionModel};
use ndarray::{Array2, Array3, ArrayView4};
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Detection model backed by an ONNX Runtime session.
pub struct OrtDetectionModel {
    session: Mutex<Session>,
}

impl OrtDetectionModel {
    /// Load a detection model from an ONNX file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let session = Session::builder()
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| Error::ModelLoad {
                reason: e.to_string(),
            })?;
        debug!("Detection model loaded: {}", path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl DetectionModel for OrtDetectionModel {
    fn infer(&self, input: ArrayView4<'_, f32>) -> Result<Array3<f32>> {
        let value =
            ort::value::Value::from_array(input.to_owned()).map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let mut session = self.session.lock().map_err(|_| Error::Internal {
            message: "detection session lock poisoned".to_string(),
        })?;
        let outputs = session
            .run(ort::inputs![value])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        if shape.len() != 3 || shape.iter().any(|&d| d <= 0) {
            return Err(Error::OutputShape {
                expected: "[1, 4 + num_classes, num_candidates]".to_string(),
                got: format!("{shape:?}"),
            });
        }

        #[allow(clippy::cast_sign_loss)]
        let dims = (shape[0] as usize, shape[1] as usize, shape[2] as usize);
        Array3::from_shape_vec(dims, data.to_vec()).map_err(|e| Error::Internal {
            message: format!("failed to shape detection output: {e}"),
        })
    }
}

/// Audio classification model backed by an ONNX Runtime session.
pub struct OrtAudioModel {
    session: Mutex<Session>,
}

impl OrtAudioModel {
    /// Load an audio model from an ONNX file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let session = Session::builder()
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| Error::ModelLoad {
                reason: e.to_string(),
            })?;
        debug!("Audio model loaded: {}", path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl AudioModel for OrtAudioModel {
    fn infer(&self, segment: &[f32]) -> Result<Vec<f32>> {
        // Model expects a [1, segment_samples] batch of one.
        let input = Array2::from_shape_vec((1, segment.len()), segment.to_vec()).map_err(|e| {
            Error::Internal {
                message: format!("failed to shape audio input: {e}"),
            }
        })?;
        let value = ort::value::Value::from_array(input).map_err(|e| Error::Inference {
            reason: e.to_string(),
        })?;

        let mut session = self.session.lock().map_err(|_| Error::Internal {
            message: "audio session lock poisoned".to_string(),
        })?;
        let outputs = session
            .run(ort::inputs![value])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        if data.is_empty() {
            return Err(Error::OutputShape {
                expected: "non-empty per-class score vector".to_string(),
                got: format!("{shape:?}"),
            });
        }

        // Leading batch dimensions of one are tolerated; the scores are the
        // flattened tail.
        Ok(data.to_vec())
    }
}

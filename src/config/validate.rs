//! Configuration validation.

use crate::config::{Config, ModelConfig};
use crate::constants::confidence;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_threshold("detector_confidence", config.defaults.detector_confidence)?;
    validate_threshold("audio_confidence", config.defaults.audio_confidence)?;
    Ok(())
}

fn validate_threshold(name: &str, value: f32) -> Result<()> {
    if (confidence::MIN..=confidence::MAX).contains(&value) {
        Ok(())
    } else {
        Err(Error::ConfigValidation {
            message: format!(
                "{name} must be between {} and {}, got {value}",
                confidence::MIN,
                confidence::MAX
            ),
        })
    }
}

/// Validate a model configuration and check its files exist.
pub fn validate_model_config(model: &ModelConfig) -> Result<()> {
    if !model.path.exists() {
        return Err(Error::ModelFileNotFound {
            path: model.path.clone(),
        });
    }

    if !model.labels.exists() {
        return Err(Error::LabelsFileNotFound {
            path: model.labels.clone(),
        });
    }

    Ok(())
}

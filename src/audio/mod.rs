//! Audio event pipeline: decode, resample, segment, classify.

mod classifier;
mod decode;
mod resample;
mod segmenter;

pub use classifier::{AudioClassifier, AudioClassifierConfig, AudioPrediction};
pub use decode::{DecodedAudio, decode_audio_bytes, decode_audio_file};
pub use resample::resample;
pub use segmenter::segment_samples;

//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "birdtag";

/// Object detector constants.
pub mod detector {
    /// Square model input resolution (width and height).
    pub const INPUT_SIZE: u32 = 640;

    /// Minimum confidence for a candidate to survive decoding.
    pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

    /// IoU threshold for non-maximum suppression.
    pub const IOU_THRESHOLD: f32 = 0.5;
}

/// Video sampling constants.
pub mod video {
    /// Seconds between sampled frames.
    pub const FRAME_INTERVAL_SECS: f32 = 1.0;

    /// Frame rate assumed when the container reports none (or zero).
    pub const FALLBACK_FPS: f32 = 25.0;
}

/// Audio pipeline constants.
pub mod audio {
    /// Sample rate expected by the audio model, in Hz.
    pub const SAMPLE_RATE: u32 = 48_000;

    /// Length of one classification segment in seconds.
    pub const SEGMENT_LENGTH_SECS: f32 = 3.0;

    /// A trailing segment shorter than this fraction of a full segment
    /// is discarded rather than zero-padded.
    pub const MIN_TAIL_FRACTION: f32 = 0.5;

    /// Default per-segment confidence threshold.
    pub const CONFIDENCE_THRESHOLD: f32 = 0.1;

    /// Number of top-scoring classes considered per segment.
    pub const TOP_K: usize = 5;

    /// Maximum predictions retained per file after global ranking.
    pub const MAX_PREDICTIONS: usize = 20;
}

/// Recognized simplified species names.
///
/// Raw model labels are reduced to this vocabulary before a record is
/// persisted; labels that match none of these contribute nothing.
pub const SIMPLIFIED_SPECIES: &[&str] = &[
    "Crow",
    "Kingfisher",
    "Myna",
    "Owl",
    "Peacock",
    "Pigeon",
    "Sparrow",
];

/// Supported file extensions by media type (lowercase, without dot).
pub mod extensions {
    /// Image extensions.
    pub const IMAGE: &[&str] = &["jpg", "jpeg", "png"];
    /// Video extensions.
    pub const VIDEO: &[&str] = &["mp4", "avi", "mov", "mkv"];
    /// Audio extensions.
    pub const AUDIO: &[&str] = &["wav", "mp3"];
}

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
}

/// Suffix appended to the source stem for audio prediction sidecar files.
pub const PREDICTIONS_SUFFIX: &str = "_predictions.json";

/// Default record store filename.
pub const DEFAULT_STORE_FILE: &str = "birdtag_records.json";

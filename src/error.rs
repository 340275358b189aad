//! Error types for birdtag.

/// Result type alias for birdtag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for birdtag.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// File extension is not a recognized media type.
    #[error("unsupported media type: '{path}'")]
    UnsupportedMediaType {
        /// Path of the offending file.
        path: std::path::PathBuf,
    },

    /// Video container decoding is not built in.
    #[error(
        "cannot decode video container '{path}': extract frames to a directory and pass it with --fps"
    )]
    VideoDecodeUnavailable {
        /// Path of the video file.
        path: std::path::PathBuf,
    },

    /// No valid media files found in the provided paths.
    #[error("no valid media files found in the provided paths")]
    NoValidMediaFiles,

    /// Failed to decode an image.
    #[error("failed to decode image '{path}'")]
    ImageDecode {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to open an audio source.
    #[error("failed to open audio source '{name}'")]
    AudioOpen {
        /// Name of the audio source.
        name: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{name}'")]
    AudioDecode {
        /// Name of the audio source.
        name: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found in the container.
    #[error("no audio tracks found in '{name}'")]
    NoAudioTracks {
        /// Name of the audio source.
        name: String,
    },

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Labels file does not exist.
    #[error("labels file does not exist: {path}")]
    LabelsFileNotFound {
        /// Path to the missing labels file.
        path: std::path::PathBuf,
    },

    /// Failed to read or parse a labels file.
    #[error("failed to load labels from '{path}': {reason}")]
    LabelsLoad {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to load a model into the inference runtime.
    #[error("failed to load model: {reason}")]
    ModelLoad {
        /// Description of the load failure.
        reason: String,
    },

    /// Inference failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Model output had an unexpected shape.
    #[error("unexpected model output shape: expected {expected}, got {got}")]
    OutputShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        got: String,
    },

    /// Failed to read the record store file.
    #[error("failed to read record store '{path}'")]
    StoreRead {
        /// Path to the store file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the record store file.
    #[error("failed to parse record store '{path}'")]
    StoreParse {
        /// Path to the store file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the record store file.
    #[error("failed to write record store '{path}'")]
    StoreWrite {
        /// Path to the store file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A query contained no usable filter groups.
    #[error("no valid filter criteria provided")]
    EmptyQuery,

    /// Failed to parse a query body.
    #[error("failed to parse query body: {reason}")]
    QueryParse {
        /// Description of the parse failure.
        reason: String,
    },

    /// Failed to write a JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

//! Media type classification by file extension.

use crate::constants::extensions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of media a file contains, decided from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image (.jpg/.jpeg/.png).
    Image,
    /// Video container (.mp4/.avi/.mov/.mkv).
    Video,
    /// Audio file (.wav/.mp3).
    Audio,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

impl MediaType {
    /// Classify a path by its extension.
    ///
    /// Returns `Error::UnsupportedMediaType` for anything outside the
    /// recognized image/video/audio extension sets.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| Error::UnsupportedMediaType {
                path: path.to_path_buf(),
            })?;

        if extensions::IMAGE.contains(&ext.as_str()) {
            Ok(Self::Image)
        } else if extensions::VIDEO.contains(&ext.as_str()) {
            Ok(Self::Video)
        } else if extensions::AUDIO.contains(&ext.as_str()) {
            Ok(Self::Audio)
        } else {
            Err(Error::UnsupportedMediaType {
                path: path.to_path_buf(),
            })
        }
    }

    /// Classify a path, returning `None` instead of an error.
    pub fn from_path_opt(path: &Path) -> Option<Self> {
        Self::from_path(path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert_eq!(
            MediaType::from_path(Path::new("photo.jpg")).ok(),
            Some(MediaType::Image)
        );
        assert_eq!(
            MediaType::from_path(Path::new("photo.JPEG")).ok(),
            Some(MediaType::Image)
        );
        assert_eq!(
            MediaType::from_path(Path::new("photo.png")).ok(),
            Some(MediaType::Image)
        );
    }

    #[test]
    fn test_video_extensions() {
        assert_eq!(
            MediaType::from_path(Path::new("clip.mp4")).ok(),
            Some(MediaType::Video)
        );
        assert_eq!(
            MediaType::from_path(Path::new("clip.MKV")).ok(),
            Some(MediaType::Video)
        );
    }

    #[test]
    fn test_audio_extensions() {
        assert_eq!(
            MediaType::from_path(Path::new("song.wav")).ok(),
            Some(MediaType::Audio)
        );
        assert_eq!(
            MediaType::from_path(Path::new("song.mp3")).ok(),
            Some(MediaType::Audio)
        );
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            MediaType::from_path(Path::new("notes.txt")),
            Err(Error::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            MediaType::from_path(Path::new("no_extension")),
            Err(Error::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(MediaType::Image.to_string(), "image");
        assert_eq!(MediaType::Video.to_string(), "video");
        assert_eq!(MediaType::Audio.to_string(), "audio");
    }
}

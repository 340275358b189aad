//! Frame source over a directory of extracted frame images.

use super::FrameSource;
use crate::error::{Error, Result};
use crate::media::MediaType;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`FrameSource`] reading pre-extracted frames from a directory.
///
/// Image files are ordered by name, so frame extractors that number their
/// output (`frame_0001.png`, ...) replay in capture order. The frame rate
/// must be supplied by the caller since a bare directory carries none.
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    fps: Option<f32>,
    pos: usize,
}

impl ImageSequenceSource {
    /// Collect the image files under `dir`, sorted by file name.
    pub fn open(dir: &Path, fps: Option<f32>) -> Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| MediaType::from_path_opt(p) == Some(MediaType::Image))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(Error::NoValidMediaFiles);
        }

        debug!(dir = %dir.display(), frames = frames.len(), "opened frame sequence");
        Ok(Self {
            frames,
            fps,
            pos: 0,
        })
    }

    /// Number of frames in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_rate(&self) -> Option<f32> {
        self.fps
    }

    fn next_frame(&mut self) -> Option<Result<RgbImage>> {
        let path = self.frames.get(self.pos)?.clone();
        self.pos += 1;

        Some(
            image::open(&path)
                .map(|img| img.to_rgb8())
                .map_err(|e| Error::ImageDecode { path, source: e }),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_frame(dir: &Path, name: &str) {
        let img = RgbImage::new(4, 4);
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_frames_replay_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_0002.png");
        write_frame(dir.path(), "frame_0001.png");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), Some(30.0)).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.frame_rate(), Some(30.0));

        assert!(source.next_frame().unwrap().is_ok());
        assert!(source.next_frame().unwrap().is_ok());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), None),
            Err(Error::NoValidMediaFiles)
        ));
    }

    #[test]
    fn test_undecodable_frame_yields_err_item() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frame_0001.png"), "not a png").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), None).unwrap();
        assert!(source.next_frame().unwrap().is_err());
    }
}

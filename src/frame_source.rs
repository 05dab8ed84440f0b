// THEORY:
// The classifier never owns a camera. A `FrameSource` is whatever hands it one
// RGBA8 buffer per tick at the analysis resolution: a camera driver, a network
// stream, or the `ImageSequenceSource` below, which replays a directory of
// still images. A device hiccup is not an error for the classifier; the source
// reports `FrameTick::Unavailable` and the pass is skipped.

use crate::config::PipelineConfig;
use futures::Stream;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "tiff"];

/// What the source produced for one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameTick {
    /// A row-major RGBA8 buffer at the analysis resolution.
    Frame(Vec<u8>),
    /// Nothing usable this tick; the analysis pass is skipped.
    Unavailable,
}

/// A supplier of frames, polled once per tick.
pub trait FrameSource {
    /// The next tick, or `None` once the source is exhausted.
    fn next_tick(&mut self) -> Option<FrameTick>;
}

impl<I> FrameSource for I
where
    I: Iterator<Item = FrameTick>,
{
    fn next_tick(&mut self) -> Option<FrameTick> {
        self.next()
    }
}

/// Replays still images from a directory in file-name order, resized to the
/// analysis resolution.
pub struct ImageSequenceSource {
    paths: std::vec::IntoIter<PathBuf>,
    width: u32,
    height: u32,
}

impl ImageSequenceSource {
    pub fn open(directory: &Path, config: &PipelineConfig) -> std::io::Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|extension| extension.to_str())
                    .is_some_and(|extension| IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();
        debug!(count = paths.len(), directory = %directory.display(), "image sequence opened");

        Ok(Self {
            paths: paths.into_iter(),
            width: config.frame_width,
            height: config.frame_height,
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    fn decode(&self, path: &Path) -> Result<Vec<u8>, image::ImageError> {
        let image = image::open(path)?;
        let resized = image.resize_exact(self.width, self.height, FilterType::Triangle);
        Ok(resized.into_rgba8().into_raw())
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_tick(&mut self) -> Option<FrameTick> {
        let path = self.paths.next()?;
        match self.decode(&path) {
            Ok(buffer) => Some(FrameTick::Frame(buffer)),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping undecodable frame");
                Some(FrameTick::Unavailable)
            }
        }
    }
}

/// Adapts a source into a stream that yields one tick per `interval`.
pub fn paced<S>(source: S, interval: Duration) -> impl Stream<Item = FrameTick>
where
    S: FrameSource,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    futures::stream::unfold((source, ticker), |(mut source, mut ticker)| async move {
        ticker.tick().await;
        let tick = source.next_tick()?;
        Some((tick, (source, ticker)))
    })
}

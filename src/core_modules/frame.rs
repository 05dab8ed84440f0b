// THEORY:
// A `Frame` is a borrowed, validated view over one row-major RGBA8 buffer owned
// by the external frame source. It lives only for the duration of one analysis
// pass. Validation happens once, at construction: a buffer whose length does not
// match its declared dimensions is a contract violation and is rejected before
// any pixel is read.
//
// A `Band` is the half-open pixel rectangle one analysis stage scans. Bands are
// declared as fractions of the frame (the expected face and torso regions of a
// centered subject) and resolved against concrete dimensions with `floor`.

use crate::constants::frame::CHANNELS;
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::FrameError;

/// A validated, read-only RGBA8 frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel at column `x`, row `y`. Callers stay inside a resolved `Band`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let byte_index = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from(&self.data[byte_index..byte_index + CHANNELS])
    }

    /// Every pixel inside `band`, row by row.
    pub fn pixels_in(&self, band: Band) -> impl Iterator<Item = Pixel> + '_ {
        band.rows()
            .flat_map(move |y| band.columns().map(move |x| self.pixel(x, y)))
    }
}

/// A half-open rectangle `[left, right) x [top, bottom)` in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Band {
    /// Resolves fractional bounds against a frame, clamping to its edges.
    pub fn from_fractions(
        width: u32,
        height: u32,
        (left, right): (f32, f32),
        (top, bottom): (f32, f32),
    ) -> Self {
        let scale = |extent: u32, fraction: f32| ((extent as f32 * fraction).floor() as u32).min(extent);
        Self {
            left: scale(width, left),
            right: scale(width, right),
            top: scale(height, top),
            bottom: scale(height, bottom),
        }
    }

    /// Drops `margin` pixels from the left and right edges.
    pub fn inset_horizontally(self, margin: u32) -> Self {
        let left = self.left.saturating_add(margin);
        let right = self.right.saturating_sub(margin).max(left);
        Self { left, right, ..self }
    }

    pub fn columns(&self) -> std::ops::Range<u32> {
        self.left..self.right.max(self.left)
    }

    pub fn rows(&self) -> std::ops::Range<u32> {
        self.top..self.bottom.max(self.top)
    }

    pub fn area(&self) -> usize {
        self.columns().len() * self.rows().len()
    }
}

// THEORY:
// The `HueHistogram` turns the torso band of one frame into a single dominant
// garment hue. It is rebuilt from scratch every frame and never outlives it.
//
// Algorithm:
// 1.  **Filtering**: each torso pixel is rejected if it is too dark, near white,
//     near gray, or skin-toned (using the garment-specific skin predicate).
// 2.  **Weighted accumulation**: survivors add `saturation^2 * value` to the
//     5-degree bin holding their hue.
// 3.  **Neutral gate**: if the total weight stays under 8, there is no clear
//     color (a white, black or gray outfit) and the result is `None`.
// 4.  **Circular smoothing**: the 72 bins are convolved with a fixed 7-tap
//     kernel, wrapping across 0 degrees.
// 5.  **Peak + centroid**: the strongest smoothed bin is located and a weighted
//     centroid is taken over the 9 bins centered on it. Offsets are measured
//     relative to the peak, so a window straddling 0 degrees averages 357.5 and
//     2.5 to 0, not to 180.

use crate::constants::garment;
use crate::core_modules::frame::{Band, Frame};
use crate::core_modules::pixel::pixel::{Hsv, normalize_degrees};
use crate::core_modules::presence::GARMENT_SKIN;

const BIN_COUNT: usize = garment::BIN_COUNT;

/// A fixed 72-bin circular histogram of hue weight.
#[derive(Debug, Clone, PartialEq)]
pub struct HueHistogram {
    bins: [f32; BIN_COUNT],
    total_weight: f32,
}

impl Default for HueHistogram {
    fn default() -> Self {
        Self {
            bins: [0.0; BIN_COUNT],
            total_weight: 0.0,
        }
    }
}

impl HueHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bin a hue falls into.
    #[inline]
    pub fn bin_index(hue: f32) -> usize {
        (hue / garment::BIN_WIDTH_DEGREES).floor() as usize % BIN_COUNT
    }

    /// The hue at the center of a bin.
    #[inline]
    pub fn bin_center(bin: usize) -> f32 {
        bin as f32 * garment::BIN_WIDTH_DEGREES + garment::BIN_WIDTH_DEGREES / 2.0
    }

    /// Adds one pixel if it looks like fabric. Returns whether it was counted.
    pub fn accumulate(&mut self, hsv: Hsv) -> bool {
        if hsv.value < garment::VALUE_MIN
            || hsv.value > garment::VALUE_MAX
            || hsv.saturation < garment::SATURATION_MIN
            || GARMENT_SKIN.matches(hsv)
        {
            return false;
        }

        let weight = hsv.saturation * hsv.saturation * hsv.value;
        self.bins[Self::bin_index(hsv.hue)] += weight;
        self.total_weight += weight;
        true
    }

    pub fn bins(&self) -> &[f32; BIN_COUNT] {
        &self.bins
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Circular convolution with the smoothing kernel.
    pub fn smoothed(&self) -> [f32; BIN_COUNT] {
        let kernel = garment::SMOOTHING_KERNEL;
        let reach = kernel.len() / 2;
        let mut smoothed = [0.0f32; BIN_COUNT];

        for (index, slot) in smoothed.iter_mut().enumerate() {
            *slot = kernel
                .iter()
                .enumerate()
                .map(|(tap, weight)| {
                    let source = (index + BIN_COUNT + tap - reach) % BIN_COUNT;
                    self.bins[source] * weight
                })
                .sum();
        }
        smoothed
    }

    /// The strongest bin; the lowest index wins a tie.
    pub fn peak_bin(smoothed: &[f32; BIN_COUNT]) -> usize {
        let mut peak = 0;
        for (index, weight) in smoothed.iter().enumerate().skip(1) {
            if *weight > smoothed[peak] {
                peak = index;
            }
        }
        peak
    }

    /// Weighted mean hue over `peak +- radius` bins, normalized to [0, 360).
    pub fn centroid_around(smoothed: &[f32; BIN_COUNT], peak: usize, radius: usize) -> f32 {
        let mut offset_sum = 0.0f32;
        let mut weight_sum = 0.0f32;

        for step in 0..=2 * radius {
            let offset = step as isize - radius as isize;
            let bin = (peak as isize + offset).rem_euclid(BIN_COUNT as isize) as usize;
            offset_sum += offset as f32 * garment::BIN_WIDTH_DEGREES * smoothed[bin];
            weight_sum += smoothed[bin];
        }

        let peak_hue = Self::bin_center(peak);
        if weight_sum <= 0.0 {
            return peak_hue;
        }
        normalize_degrees(peak_hue + offset_sum / weight_sum)
    }

    /// The dominant hue, or `None` when too little colored weight was seen.
    pub fn dominant_hue(&self) -> Option<f32> {
        if self.total_weight < garment::MIN_TOTAL_WEIGHT {
            return None;
        }
        let smoothed = self.smoothed();
        let peak = Self::peak_bin(&smoothed);
        Some(Self::centroid_around(&smoothed, peak, garment::CENTROID_RADIUS))
    }
}

/// The region scanned for clothing: 30%-72% of the height, minus the edge margins.
pub fn torso_band(width: u32, height: u32) -> Band {
    Band::from_fractions(width, height, (0.0, 1.0), (garment::BAND_TOP, garment::BAND_BOTTOM))
        .inset_horizontally(garment::EDGE_MARGIN)
}

/// Builds this frame's histogram from the torso band.
pub fn build_histogram(frame: &Frame) -> HueHistogram {
    let mut histogram = HueHistogram::new();
    for pixel in frame.pixels_in(torso_band(frame.width(), frame.height())) {
        histogram.accumulate(pixel.hsv());
    }
    histogram
}

/// The dominant garment hue in [0, 360), or `None` for a neutral outfit.
pub fn extract_garment_hue(frame: &Frame) -> Option<f32> {
    build_histogram(frame).dominant_hue()
}

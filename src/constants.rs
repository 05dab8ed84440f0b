// THEORY:
// Every empirically tuned figure the classifier depends on lives here. None of
// them are derived; they were fitted against real camera footage of a single,
// centered, upright subject at the 48x103 analysis resolution, and the tests
// pin behavior to these exact values.

/// Analysis frame geometry.
pub mod frame {
    /// Default analysis width in pixels (portrait, roughly 1:2.15).
    pub const DEFAULT_WIDTH: u32 = 48;
    /// Default analysis height in pixels.
    pub const DEFAULT_HEIGHT: u32 = 103;
    /// Bytes per RGBA8 sample.
    pub const CHANNELS: usize = 4;
}

/// Face band and skin thresholds used to decide whether someone is in frame.
pub mod presence {
    /// Horizontal band start, as a fraction of frame width.
    pub const BAND_LEFT: f32 = 0.15;
    /// Horizontal band end (exclusive), as a fraction of frame width.
    pub const BAND_RIGHT: f32 = 0.85;
    /// Vertical band start, as a fraction of frame height.
    pub const BAND_TOP: f32 = 0.02;
    /// Vertical band end (exclusive), as a fraction of frame height.
    pub const BAND_BOTTOM: f32 = 0.28;

    pub const SKIN_HUE_WARM_MAX: f32 = 40.0;
    pub const SKIN_HUE_COOL_MIN: f32 = 340.0;
    pub const SKIN_SATURATION_MIN: f32 = 0.10;
    pub const SKIN_SATURATION_MAX: f32 = 0.68;
    pub const SKIN_VALUE_MIN: f32 = 0.28;
    pub const SKIN_VALUE_MAX: f32 = 0.97;

    /// Weight kept from the previous smoothed ratio each frame.
    pub const RETENTION: f32 = 0.85;
    /// Smoothed ratio above which an absent subject becomes present.
    pub const ON_THRESHOLD: f32 = 0.09;
    /// Smoothed ratio below which a present subject becomes absent.
    pub const OFF_THRESHOLD: f32 = 0.05;
}

/// Torso band, pixel rejection windows and histogram shape for the garment hue.
pub mod garment {
    pub const BAND_TOP: f32 = 0.30;
    pub const BAND_BOTTOM: f32 = 0.72;
    /// Pixels skipped on each horizontal edge (background bleed).
    pub const EDGE_MARGIN: u32 = 4;

    pub const VALUE_MIN: f32 = 0.15;
    pub const VALUE_MAX: f32 = 0.97;
    pub const SATURATION_MIN: f32 = 0.20;

    // Looser than the presence predicate on saturation, stricter on value.
    pub const SKIN_HUE_WARM_MAX: f32 = 35.0;
    pub const SKIN_HUE_COOL_MIN: f32 = 340.0;
    pub const SKIN_SATURATION_MIN: f32 = 0.15;
    pub const SKIN_SATURATION_MAX: f32 = 0.65;
    pub const SKIN_VALUE_MIN: f32 = 0.35;
    pub const SKIN_VALUE_MAX: f32 = 0.95;

    pub const BIN_COUNT: usize = 72;
    pub const BIN_WIDTH_DEGREES: f32 = 5.0;
    /// Below this accumulated weight the outfit is treated as neutral.
    pub const MIN_TOTAL_WEIGHT: f32 = 8.0;
    /// Circular smoothing taps, centered on index 3.
    pub const SMOOTHING_KERNEL: [f32; 7] = [0.15, 0.2, 0.3, 1.0, 0.3, 0.2, 0.15];
    /// Bins on each side of the peak that contribute to the centroid.
    pub const CENTROID_RADIUS: usize = 4;
}

/// Display hue easing and event timing.
pub mod output {
    use std::time::Duration;

    pub const HUE_LERP_SPEED: f32 = 0.07;
    /// Blue center; the display hue before anyone has been classified.
    pub const INITIAL_HUE: f32 = 225.0;
    pub const NEUTRAL_HUE: f32 = 260.0;
    pub const NEUTRAL_HEX: &str = "#9b8ec4";
    pub const ZONE_SATURATION_PERCENT: f64 = 80.0;
    pub const ZONE_LIGHTNESS_PERCENT: f64 = 48.0;
    pub const ZONE_CHANGE_DEBOUNCE: Duration = Duration::from_millis(400);
}

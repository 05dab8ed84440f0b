// THEORY:
// Presence is decided in two layers.
//
// 1.  **Detection (stateless)**: `detect_presence` scans the band where a
//     centered, upright subject's face sits (middle 70% of the width, 2%-28% of
//     the height) and reports the fraction of skin-toned pixels. It knows
//     nothing about previous frames.
// 2.  **Hysteresis (stateful)**: `PresenceTracker` feeds that ratio through a
//     first-order exponential filter (about a 7-frame time constant) and runs a
//     two-threshold Schmitt trigger on the result. The subject arrives when the
//     smoothed ratio rises above 0.09 and leaves only when it falls below 0.05.
//     The dead band between the thresholds is what stops the output flapping
//     when someone hovers at the edge of detection; the two thresholds must
//     never be collapsed into one.
//
// The skin predicate is a plain value so the garment stage can carry its own,
// slightly different, instance (see `GARMENT_SKIN`).

use crate::constants::{garment, presence};
use crate::core_modules::frame::{Band, Frame};
use crate::core_modules::pixel::pixel::Hsv;
use tracing::debug;

/// A box in HSV space describing skin tones: warm hues (wrapping through red)
/// with bounded saturation and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinPredicate {
    pub hue_warm_max: f32,
    pub hue_cool_min: f32,
    pub saturation_min: f32,
    pub saturation_max: f32,
    pub value_min: f32,
    pub value_max: f32,
}

impl SkinPredicate {
    pub fn matches(&self, hsv: Hsv) -> bool {
        (hsv.hue <= self.hue_warm_max || hsv.hue >= self.hue_cool_min)
            && (self.saturation_min..=self.saturation_max).contains(&hsv.saturation)
            && (self.value_min..=self.value_max).contains(&hsv.value)
    }
}

/// Skin as seen in the face band.
pub const PRESENCE_SKIN: SkinPredicate = SkinPredicate {
    hue_warm_max: presence::SKIN_HUE_WARM_MAX,
    hue_cool_min: presence::SKIN_HUE_COOL_MIN,
    saturation_min: presence::SKIN_SATURATION_MIN,
    saturation_max: presence::SKIN_SATURATION_MAX,
    value_min: presence::SKIN_VALUE_MIN,
    value_max: presence::SKIN_VALUE_MAX,
};

/// Skin as rejected from the torso band (hands, arms, neckline).
pub const GARMENT_SKIN: SkinPredicate = SkinPredicate {
    hue_warm_max: garment::SKIN_HUE_WARM_MAX,
    hue_cool_min: garment::SKIN_HUE_COOL_MIN,
    saturation_min: garment::SKIN_SATURATION_MIN,
    saturation_max: garment::SKIN_SATURATION_MAX,
    value_min: garment::SKIN_VALUE_MIN,
    value_max: garment::SKIN_VALUE_MAX,
};

/// The region scanned for a face.
pub fn face_band(width: u32, height: u32) -> Band {
    Band::from_fractions(
        width,
        height,
        (presence::BAND_LEFT, presence::BAND_RIGHT),
        (presence::BAND_TOP, presence::BAND_BOTTOM),
    )
}

/// Fraction of skin-toned pixels in the face band, in [0, 1].
/// Returns 0 for a degenerate band.
pub fn detect_presence(frame: &Frame) -> f32 {
    let band = face_band(frame.width(), frame.height());
    let total = band.area();
    if total == 0 {
        return 0.0;
    }

    let skin = frame
        .pixels_in(band)
        .filter(|pixel| PRESENCE_SKIN.matches(pixel.hsv()))
        .count();

    skin as f32 / total as f32
}

/// A change in the debounced presence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    Arrived,
    Departed,
}

/// Exponentially smoothed skin ratio with a two-threshold trigger.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    /// The smoothed ratio. Persists across frames.
    smoothed: f32,
    /// The debounced present/absent state.
    active: bool,
    retention: f32,
    on_threshold: f32,
    off_threshold: f32,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new(presence::RETENTION, presence::ON_THRESHOLD, presence::OFF_THRESHOLD)
    }
}

impl PresenceTracker {
    pub fn new(retention: f32, on_threshold: f32, off_threshold: f32) -> Self {
        Self {
            smoothed: 0.0,
            active: false,
            retention,
            on_threshold,
            off_threshold,
        }
    }

    /// Folds one frame's raw ratio into the filter and reports a transition, if any.
    pub fn update(&mut self, ratio: f32) -> Option<PresenceTransition> {
        self.smoothed = self.smoothed * self.retention + ratio * (1.0 - self.retention);

        if !self.active && self.smoothed > self.on_threshold {
            self.active = true;
            debug!(smoothed = self.smoothed, "presence rose above on-threshold");
            return Some(PresenceTransition::Arrived);
        }
        if self.active && self.smoothed < self.off_threshold {
            self.active = false;
            debug!(smoothed = self.smoothed, "presence fell below off-threshold");
            return Some(PresenceTransition::Departed);
        }
        None
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::rgb_to_hsv;

    #[test]
    fn typical_skin_matches_both_predicates() {
        let skin = rgb_to_hsv(224, 172, 140);
        assert!(PRESENCE_SKIN.matches(skin));
        assert!(GARMENT_SKIN.matches(skin));
    }

    #[test]
    fn predicates_diverge_on_dim_skin() {
        // Value 0.30: dim enough for the garment stage to keep, bright enough for presence.
        let dim = Hsv { hue: 20.0, saturation: 0.4, value: 0.30 };
        assert!(PRESENCE_SKIN.matches(dim));
        assert!(!GARMENT_SKIN.matches(dim));
    }

    #[test]
    fn vivid_red_is_not_skin() {
        assert!(!PRESENCE_SKIN.matches(Hsv { hue: 5.0, saturation: 0.9, value: 0.8 }));
        assert!(!PRESENCE_SKIN.matches(Hsv { hue: 200.0, saturation: 0.4, value: 0.8 }));
    }

    #[test]
    fn steady_ratio_below_threshold_never_trips() {
        let mut tracker = PresenceTracker::default();
        for _ in 0..500 {
            assert_eq!(tracker.update(0.089), None);
        }
        assert!(!tracker.is_active());
    }

    #[test]
    fn smoothed_value_not_raw_value_trips_activation() {
        let mut tracker = PresenceTracker::default();
        // 0.1 * (1 - 0.85^n) first exceeds 0.09 at n = 15.
        for frame in 1..15 {
            assert_eq!(tracker.update(0.1), None, "tripped early at frame {frame}");
        }
        assert_eq!(tracker.update(0.1), Some(PresenceTransition::Arrived));
        assert!(tracker.smoothed() > 0.09);
    }

    #[test]
    fn deactivation_waits_for_the_lower_threshold() {
        let mut tracker = PresenceTracker::default();
        assert_eq!(tracker.update(1.0), Some(PresenceTransition::Arrived));

        // Decay from 0.15 with zero input: passes through the dead band first.
        let mut frames_in_dead_band = 0;
        loop {
            match tracker.update(0.0) {
                Some(PresenceTransition::Departed) => break,
                Some(other) => panic!("unexpected {other:?}"),
                None => {
                    assert!(tracker.is_active());
                    if tracker.smoothed() < 0.09 {
                        frames_in_dead_band += 1;
                    }
                }
            }
        }
        assert!(frames_in_dead_band > 0);
        assert!(tracker.smoothed() < 0.05);
        assert!(!tracker.is_active());
    }
}

// THEORY:
// Raw garment hues are noisy and continuous; the effects downstream want a
// handful of bold, recognizable colors. The zone table snaps any hue onto one of
// eight named zones, each with a canonical center hue.
//
// The table partitions the hue circle exactly: ranges are half-open `[lo, hi)`,
// each `hi` is the next zone's `lo`, and Red alone wraps through 0 degrees
// (`lo` = 330 > `hi` = 18). The boundaries are tuned so that the whole
// 200-265 band reads as Blue rather than drifting into Green under cool light.
//
// A frame with no clear color is classified `Neutral` rather than forced into
// a zone.

use crate::constants::output;
use crate::core_modules::pixel::pixel::hsl_to_hex;

/// One named slice of the hue circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub name: &'static str,
    /// Canonical hue the display eases toward.
    pub center: f32,
    /// Inclusive lower bound in degrees.
    pub lo: f32,
    /// Exclusive upper bound in degrees. Less than `lo` for the wrapping zone.
    pub hi: f32,
}

impl Zone {
    pub fn wraps(&self) -> bool {
        self.lo > self.hi
    }

    pub fn contains(&self, hue: f32) -> bool {
        if self.wraps() {
            hue >= self.lo || hue < self.hi
        } else {
            hue >= self.lo && hue < self.hi
        }
    }

    /// The zone's event color: its center at 80% saturation, 48% lightness.
    pub fn hex(&self) -> String {
        hsl_to_hex(
            self.center as f64,
            output::ZONE_SATURATION_PERCENT,
            output::ZONE_LIGHTNESS_PERCENT,
        )
    }
}

pub const ZONES: [Zone; 8] = [
    Zone { name: "Red", center: 5.0, lo: 330.0, hi: 18.0 },
    Zone { name: "Orange", center: 28.0, lo: 18.0, hi: 44.0 },
    Zone { name: "Yellow", center: 58.0, lo: 44.0, hi: 72.0 },
    Zone { name: "Green", center: 120.0, lo: 72.0, hi: 165.0 },
    Zone { name: "Teal", center: 180.0, lo: 165.0, hi: 200.0 },
    Zone { name: "Blue", center: 225.0, lo: 200.0, hi: 265.0 },
    Zone { name: "Purple", center: 280.0, lo: 265.0, hi: 310.0 },
    Zone { name: "Pink", center: 325.0, lo: 310.0, hi: 330.0 },
];

const FALLBACK_ZONE: usize = 5;

/// Snaps a raw hue in [0, 360) onto its zone.
pub fn snap_to_zone(raw_hue: f32) -> &'static Zone {
    ZONES
        .iter()
        .find(|zone| zone.contains(raw_hue))
        // Unreachable for hues in [0, 360); NaN lands here.
        .unwrap_or(&ZONES[FALLBACK_ZONE])
}

pub const NEUTRAL_NAME: &str = "neutral";

/// What one active frame's outfit was classified as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    Zone(&'static Zone),
    /// White, black, gray or otherwise colorless clothing.
    Neutral,
}

impl Classification {
    /// Classifies the extractor's output.
    pub fn from_raw_hue(raw_hue: Option<f32>) -> Self {
        match raw_hue {
            Some(hue) => Classification::Zone(snap_to_zone(hue)),
            None => Classification::Neutral,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Classification::Zone(zone) => zone.name,
            Classification::Neutral => NEUTRAL_NAME,
        }
    }

    /// The hue the display should ease toward.
    pub fn target_hue(&self) -> f32 {
        match self {
            Classification::Zone(zone) => zone.center,
            Classification::Neutral => output::NEUTRAL_HUE,
        }
    }

    pub fn hex(&self) -> String {
        match self {
            Classification::Zone(zone) => zone.hex(),
            Classification::Neutral => output::NEUTRAL_HEX.to_string(),
        }
    }
}

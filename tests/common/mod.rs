#![allow(dead_code)]

use aura_vision::core_modules::pixel::pixel::hsv_to_rgb;
use aura_vision::pipeline::AuraEvent;

pub const WIDTH: usize = 48;
pub const HEIGHT: usize = 103;

/// A typical lit skin tone, well inside the presence window.
pub const SKIN: (u8, u8, u8) = (224, 172, 140);

/// Rows 0..30 hold the face, the rest is torso. Both bands of a 48x103 frame
/// fall inside these rows.
pub fn synthetic_frame(face: Option<(u8, u8, u8)>, torso: (u8, u8, u8)) -> Vec<u8> {
    let mut data = vec![0u8; WIDTH * HEIGHT * 4];
    for (index, pixel) in data.chunks_mut(4).enumerate() {
        let (r, g, b) = match (index / WIDTH, face) {
            (0..=29, Some(skin)) => skin,
            (0..=29, None) => (128, 128, 128),
            _ => torso,
        };
        pixel.copy_from_slice(&[r, g, b, 255]);
    }
    data
}

pub fn person_in(hue: f32, saturation: f32, value: f32) -> Vec<u8> {
    synthetic_frame(Some(SKIN), hsv_to_rgb(hue, saturation, value))
}

pub fn zone_names(events: &[AuraEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            AuraEvent::ZoneChanged { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// Signed distance from `a` to `b` around the circle, in (-180, 180].
pub fn circular_difference(a: f32, b: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

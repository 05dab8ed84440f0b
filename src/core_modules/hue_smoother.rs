// THEORY:
// The raw classification jumps between zone centers; the display hue must not.
// `HueSmoother` eases a persistent display hue toward the current target by a
// fixed fraction each frame, always along the shorter arc of the hue circle.
// Convergence is geometric, and because the step is a fraction of the signed
// shortest difference the display can never overshoot by going the long way
// around.

use crate::constants::output;
use crate::core_modules::pixel::pixel::normalize_degrees;

/// Signed shortest angular difference `target - current`, in (-180, 180].
pub fn shortest_arc(current: f32, target: f32) -> f32 {
    let mut difference = target - current;
    if difference > 180.0 {
        difference -= 360.0;
    }
    if difference < -180.0 {
        difference += 360.0;
    }
    difference
}

/// Advances `current` toward `target` by `speed` of the shortest arc.
pub fn lerp_hue(current: f32, target: f32, speed: f32) -> f32 {
    normalize_degrees(current + shortest_arc(current, target) * speed)
}

/// The persistent display hue and the target it eases toward.
#[derive(Debug, Clone)]
pub struct HueSmoother {
    current: f32,
    target: f32,
    speed: f32,
}

impl Default for HueSmoother {
    fn default() -> Self {
        Self::new(output::INITIAL_HUE, output::HUE_LERP_SPEED)
    }
}

impl HueSmoother {
    pub fn new(initial_hue: f32, speed: f32) -> Self {
        let initial_hue = normalize_degrees(initial_hue);
        Self {
            current: initial_hue,
            target: initial_hue,
            speed,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = normalize_degrees(target);
    }

    /// Moves one frame toward the target and returns the new display hue.
    pub fn step(&mut self) -> f32 {
        self.current = lerp_hue(self.current, self.target, self.speed);
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

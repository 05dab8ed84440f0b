//! Single-concern analysis stages, leaves first.

pub mod pixel;
pub mod frame;
pub mod presence;
pub mod hue_histogram;
pub mod zone;
pub mod hue_smoother;
pub mod debounce;

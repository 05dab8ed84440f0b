// THEORY:
// This file is the main entry point for the `aura_vision` library crate.
// The public face is the `pipeline` module: `AuraPipeline`, its
// `PipelineConfig`, and the `AuraEvent`s it emits. The analysis stages live in
// `core_modules`, each a single concern that can be exercised on its own. The
// async `service` and the `frame_source` seam wrap the pipeline for a live
// feed; the pipeline itself never touches a clock, a thread or a device.

pub mod config;
pub mod constants;
pub mod core_modules;
pub mod error;
pub mod frame_source;
pub mod pipeline;
pub mod service;

pub use error::{ConfigError, FrameError};
pub use pipeline::{AuraEvent, AuraPipeline, PipelineConfig};

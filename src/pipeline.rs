// THEORY:
// The `pipeline` module is the top-level API of the classifier. `AuraPipeline`
// is the classification event driver: it runs every analysis stage once per
// frame, owns all state that must survive between frames, and turns state
// transitions into discrete `AuraEvent`s for an external renderer.
//
// Per frame:
// 1.  Deliver any debounced zone change that has come due.
// 2.  Presence: face-band skin ratio -> hysteresis tracker. Leaving resets all
//     classification state.
// 3.  While present: torso histogram -> dominant hue -> zone (or neutral). A
//     zone differing from the last committed one is committed at once and its
//     event scheduled 400 ms out, unless a delivery is already outstanding.
// 4.  Ease the display hue toward the zone's center and report it.
//
// All cross-frame state lives in the pipeline value itself, so independent
// pipelines (one per camera, one per test) never interfere. The pipeline is
// single-threaded; the async `service` confines it to one task.

use crate::core_modules::debounce::{DebounceTimer, Delivery};
use crate::core_modules::frame::Frame;
use crate::core_modules::hue_histogram::extract_garment_hue;
use crate::core_modules::hue_smoother::HueSmoother;
use crate::core_modules::presence::{PresenceTracker, PresenceTransition, detect_presence};
use crate::core_modules::zone::{Classification, snap_to_zone};
use crate::error::FrameError;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

// Re-export key data structures for the public API.
pub use crate::config::PipelineConfig;
pub use crate::core_modules::zone::{NEUTRAL_NAME, ZONES, Zone};

/// A discrete output of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum AuraEvent {
    /// The debounced presence state flipped.
    PresenceChanged { active: bool },
    /// The smoothed display hue for this frame. Emitted every active frame.
    HueUpdated { degrees: f32 },
    /// A debounced transition to a new color zone (or "neutral").
    ZoneChanged { name: String, hex: String },
}

/// What the extractor made of the torso on an active frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GarmentReading {
    Colored { raw_hue: f32, zone: &'static Zone },
    Neutral,
}

impl From<Option<f32>> for GarmentReading {
    fn from(raw_hue: Option<f32>) -> Self {
        match raw_hue {
            Some(raw_hue) => GarmentReading::Colored {
                raw_hue,
                zone: snap_to_zone(raw_hue),
            },
            None => GarmentReading::Neutral,
        }
    }
}

impl GarmentReading {
    pub fn classification(&self) -> Classification {
        match self {
            GarmentReading::Colored { zone, .. } => Classification::Zone(*zone),
            GarmentReading::Neutral => Classification::Neutral,
        }
    }
}

/// A snapshot of the last analysed frame, for status displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub active: bool,
    /// Smoothed skin ratio in [0, 1].
    pub skin_ratio: f32,
    /// Set on every active frame, `None` while nobody is present.
    pub garment: Option<GarmentReading>,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let skin = self.skin_ratio * 100.0;
        match self.garment {
            None => write!(f, "NO PERSON"),
            Some(GarmentReading::Colored { raw_hue, zone }) => write!(
                f,
                "skin:{skin:.0}%  raw:{raw_hue:.0}° → {} ({:.0}°)",
                zone.name, zone.center
            ),
            Some(GarmentReading::Neutral) => write!(f, "skin:{skin:.0}%  neutral outfit"),
        }
    }
}

/// The main, top-level struct for the classifier.
pub struct AuraPipeline {
    config: PipelineConfig,
    presence: PresenceTracker,
    hue: HueSmoother,
    /// Last committed zone name. `None` until the first classification after arrival.
    last_zone: Option<&'static str>,
    zone_changes: DebounceTimer<Classification>,
    diagnostics: Diagnostics,
}

impl AuraPipeline {
    /// Builds a pipeline. The config is trusted; loaders call `validate`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            presence: PresenceTracker::new(
                config.presence_retention,
                config.presence_on_threshold,
                config.presence_off_threshold,
            ),
            hue: HueSmoother::new(config.initial_hue, config.hue_lerp_speed),
            last_zone: None,
            zone_changes: DebounceTimer::new(config.debounce()),
            diagnostics: Diagnostics::default(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one analysis pass. `frame` is `None` when the source had nothing
    /// this tick; only due deliveries run then. `now` is the time since the
    /// pipeline started, on whatever clock the caller drives.
    pub fn process_frame(&mut self, frame: Option<&[u8]>, now: Duration) -> Result<Vec<AuraEvent>, FrameError> {
        let frame = frame
            .map(|data| Frame::new(data, self.config.frame_width, self.config.frame_height))
            .transpose()?;

        let mut events = self.advance(now);
        if let Some(frame) = frame {
            self.analyse(&frame, now, &mut events);
        }
        Ok(events)
    }

    /// Delivers debounced zone changes that are due at `now`, without a frame.
    pub fn advance(&mut self, now: Duration) -> Vec<AuraEvent> {
        let mut events = Vec::new();
        for delivery in self.zone_changes.poll(now) {
            match delivery {
                Delivery::Fresh(classification) if self.presence.is_active() => {
                    info!(zone = classification.name(), "zone changed");
                    events.push(AuraEvent::ZoneChanged {
                        name: classification.name().to_string(),
                        hex: classification.hex(),
                    });
                }
                Delivery::Fresh(classification) | Delivery::Stale(classification) => {
                    debug!(zone = classification.name(), "dropping zone change scheduled before subject left");
                }
            }
        }
        events
    }

    fn analyse(&mut self, frame: &Frame, now: Duration, events: &mut Vec<AuraEvent>) {
        let ratio = detect_presence(frame);
        match self.presence.update(ratio) {
            Some(PresenceTransition::Arrived) => {
                info!(smoothed = self.presence.smoothed(), "PERSON DETECTED");
                events.push(AuraEvent::PresenceChanged { active: true });
            }
            Some(PresenceTransition::Departed) => {
                info!(smoothed = self.presence.smoothed(), "NO PERSON");
                self.reset_classification();
                events.push(AuraEvent::PresenceChanged { active: false });
            }
            None => {}
        }

        self.diagnostics = Diagnostics {
            active: self.presence.is_active(),
            skin_ratio: self.presence.smoothed(),
            garment: None,
        };
        if !self.presence.is_active() {
            return;
        }

        let garment = GarmentReading::from(extract_garment_hue(frame));
        let classification = garment.classification();
        self.hue.set_target(classification.target_hue());

        if self.last_zone != Some(classification.name()) && self.zone_changes.schedule(now, classification) {
            debug!(zone = classification.name(), due_in = ?self.zone_changes.delay(), "zone change scheduled");
            self.last_zone = Some(classification.name());
        }

        self.diagnostics.garment = Some(garment);
        debug!(status = %self.diagnostics, "frame analysed");

        events.push(AuraEvent::HueUpdated { degrees: self.hue.step() });
    }

    fn reset_classification(&mut self) {
        self.last_zone = None;
        self.zone_changes.reset();
        self.hue.set_target(self.config.initial_hue);
    }

    /// When the next debounced delivery comes due, if one is outstanding.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.zone_changes.next_deadline()
    }

    pub fn is_active(&self) -> bool {
        self.presence.is_active()
    }

    pub fn display_hue(&self) -> f32 {
        self.hue.current()
    }

    pub fn target_hue(&self) -> f32 {
        self.hue.target()
    }

    pub fn last_zone(&self) -> Option<&'static str> {
        self.last_zone
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::hsv_to_rgb;

    const TICK: Duration = Duration::from_millis(16);

    /// A 48x103 frame: `face` in the face rows, `torso` everywhere below, gray elsewhere.
    fn frame(face: Option<(u8, u8, u8)>, torso: (u8, u8, u8)) -> Vec<u8> {
        let (width, height) = (48usize, 103usize);
        let mut data = vec![0u8; width * height * 4];
        for (index, pixel) in data.chunks_mut(4).enumerate() {
            let y = index / width;
            let (r, g, b) = match (y, face) {
                (0..=29, Some(skin)) => skin,
                (0..=29, None) => (128, 128, 128),
                _ => torso,
            };
            pixel.copy_from_slice(&[r, g, b, 255]);
        }
        data
    }

    const SKIN: (u8, u8, u8) = (224, 172, 140);

    fn run(pipeline: &mut AuraPipeline, data: &[u8], frames: u32, start: Duration) -> (Vec<AuraEvent>, Duration) {
        let mut events = Vec::new();
        let mut now = start;
        for _ in 0..frames {
            events.extend(pipeline.process_frame(Some(data), now).unwrap());
            now += TICK;
        }
        (events, now)
    }

    fn zone_changes(events: &[AuraEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                AuraEvent::ZoneChanged { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_scene_emits_nothing() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (events, _) = run(&mut pipeline, &frame(None, (128, 128, 128)), 60, Duration::ZERO);
        assert!(events.is_empty());
        assert_eq!(pipeline.diagnostics().to_string(), "NO PERSON");
    }

    #[test]
    fn wrong_buffer_size_is_rejected_before_analysis() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let result = pipeline.process_frame(Some(&[0u8; 16]), Duration::ZERO);
        assert!(matches!(result, Err(FrameError::BufferSize { actual: 16, .. })));
        assert!(!pipeline.is_active());
    }

    #[test]
    fn missing_frame_only_advances_time() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (r, g, b) = hsv_to_rgb(120.0, 0.8, 0.7);
        let (events, now) = run(&mut pipeline, &frame(Some(SKIN), (r, g, b)), 1, Duration::ZERO);
        assert_eq!(events[0], AuraEvent::PresenceChanged { active: true });
        assert!(zone_changes(&events).is_empty());

        let hue_before = pipeline.display_hue();
        assert!(pipeline.process_frame(None, now).unwrap().is_empty());
        assert_eq!(pipeline.display_hue(), hue_before);

        let delivered = pipeline.process_frame(None, Duration::from_millis(400)).unwrap();
        assert_eq!(zone_changes(&delivered), vec!["Green"]);
    }

    #[test]
    fn flicker_during_a_pending_delivery_is_absorbed() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (r, g, b) = hsv_to_rgb(225.0, 0.8, 0.7);
        let blue = frame(Some(SKIN), (r, g, b));
        let (r, g, b) = hsv_to_rgb(280.0, 0.8, 0.7);
        let purple = frame(Some(SKIN), (r, g, b));

        let (mut events, now) = run(&mut pipeline, &blue, 3, Duration::ZERO);
        let (more, now) = run(&mut pipeline, &purple, 3, now);
        events.extend(more);
        let (more, now) = run(&mut pipeline, &blue, 30, now);
        events.extend(more);

        // Purple never committed: Blue was pending, and Blue is still current afterwards.
        assert_eq!(zone_changes(&events), vec!["Blue"]);
        assert_eq!(pipeline.last_zone(), Some("Blue"));
        assert!(now > Duration::from_millis(400));
    }

    #[test]
    fn lasting_change_absorbed_while_pending_commits_once_the_slot_frees() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (r, g, b) = hsv_to_rgb(225.0, 0.8, 0.7);
        let blue = frame(Some(SKIN), (r, g, b));
        let (r, g, b) = hsv_to_rgb(280.0, 0.8, 0.7);
        let purple = frame(Some(SKIN), (r, g, b));

        let mut deliveries = Vec::new();
        let mut now = Duration::ZERO;
        for tick in 0..70 {
            let data = if tick < 3 { &blue } else { &purple };
            let events = pipeline.process_frame(Some(data), now).unwrap();
            for name in zone_changes(&events) {
                deliveries.push((name.to_string(), now));
            }
            if tick == 25 {
                // Blue was delivered on this frame and Purple took the freed slot.
                assert_eq!(pipeline.last_zone(), Some("Purple"));
                assert_eq!(pipeline.next_deadline(), Some(now + Duration::from_millis(400)));
            }
            now += TICK;
        }

        // 16 ms ticks: the 400 ms deadline is met on tick 25, the 800 ms one on tick 50.
        assert_eq!(
            deliveries,
            vec![
                ("Blue".to_string(), Duration::from_millis(400)),
                ("Purple".to_string(), Duration::from_millis(800)),
            ]
        );
        assert_eq!(pipeline.last_zone(), Some("Purple"));
        assert_eq!(pipeline.next_deadline(), None);
    }

    #[test]
    fn departure_resets_classification_and_suppresses_pending_delivery() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (r, g, b) = hsv_to_rgb(120.0, 0.8, 0.7);
        let (events, now) = run(&mut pipeline, &frame(Some(SKIN), (r, g, b)), 1, Duration::ZERO);
        assert_eq!(events[0], AuraEvent::PresenceChanged { active: true });
        assert_eq!(pipeline.last_zone(), Some("Green"));

        // Smoothed ratio 0.15 decays below 0.05 within 7 empty frames (~112 ms).
        let (events, _) = run(&mut pipeline, &frame(None, (128, 128, 128)), 40, now);
        assert!(events.contains(&AuraEvent::PresenceChanged { active: false }));
        assert!(zone_changes(&events).is_empty(), "stale delivery leaked: {events:?}");
        assert_eq!(pipeline.last_zone(), None);
        assert_eq!(pipeline.target_hue(), 225.0);
        assert_eq!(pipeline.next_deadline(), None);
    }

    #[test]
    fn diagnostics_render_status_line() {
        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        let (r, g, b) = hsv_to_rgb(120.0, 0.8, 0.7);
        run(&mut pipeline, &frame(Some(SKIN), (r, g, b)), 1, Duration::ZERO);
        let status = pipeline.diagnostics().to_string();
        assert!(status.starts_with("skin:15%  raw:12"), "got {status}");
        assert!(status.ends_with("→ Green (120°)"), "got {status}");
        assert!(matches!(
            pipeline.diagnostics().garment,
            Some(GarmentReading::Colored { zone, .. }) if zone.name == "Green"
        ));

        let mut pipeline = AuraPipeline::new(PipelineConfig::default());
        run(&mut pipeline, &frame(Some(SKIN), (40, 40, 40)), 1, Duration::ZERO);
        assert_eq!(pipeline.diagnostics().to_string(), "skin:15%  neutral outfit");
    }
}

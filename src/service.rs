// THEORY:
// `AuraService` is the async shell around one `AuraPipeline`. The pipeline is
// single-threaded and clock-free; the service supplies the clock and the
// concurrency.
//
// Key architectural principles:
// 1.  **Confinement**: the pipeline is owned by the one task running `run`. No
//     lock guards it because nothing else can reach it.
// 2.  **Deferred delivery without blocking**: the loop waits on whichever comes
//     first, the next frame or the pipeline's pending debounce deadline, so a
//     zone change still goes out on time when the frame source stalls.
// 3.  **Event bus**: events fan out over a `tokio::sync::broadcast` channel.
//     Renderers subscribe; a slow or absent subscriber never stalls analysis.
// 4.  **Drain on exit**: when the stream ends, every outstanding delivery,
//     stale or fresh, is allowed to come due before `run` returns.

use crate::error::FrameError;
use crate::frame_source::FrameTick;
use crate::pipeline::{AuraEvent, AuraPipeline, PipelineConfig};
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_BUS_CAPACITY: usize = 64;

/// Totals for one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_analysed: u64,
    pub frames_unavailable: u64,
    pub events_published: u64,
}

/// Fan-out channel for classifier events.
#[derive(Clone)]
pub struct EventBus {
    pub events_tx: broadcast::Sender<AuraEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel::<AuraEvent>(capacity.max(1));
        Self { events_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuraEvent> {
        self.events_tx.subscribe()
    }
}

pub struct AuraService {
    pipeline: AuraPipeline,
    bus: EventBus,
}

impl AuraService {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: AuraPipeline::new(config),
            bus: EventBus::new(DEFAULT_BUS_CAPACITY),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuraEvent> {
        self.bus.subscribe()
    }

    /// Drives the pipeline until `frames` ends and any pending delivery resolves.
    /// A frame of the wrong size aborts the run.
    pub async fn run<S>(&mut self, frames: S) -> Result<RunSummary, FrameError>
    where
        S: Stream<Item = FrameTick>,
    {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        let mut frames = std::pin::pin!(frames);

        loop {
            let deadline = self.pipeline.next_deadline().map(|due| started + due);

            tokio::select! {
                tick = frames.next() => {
                    let Some(tick) = tick else { break };
                    let now = started.elapsed();
                    let events = match tick {
                        FrameTick::Frame(buffer) => {
                            summary.frames_analysed += 1;
                            self.pipeline.process_frame(Some(&buffer), now)?
                        }
                        FrameTick::Unavailable => {
                            summary.frames_unavailable += 1;
                            debug!("no frame this tick");
                            self.pipeline.process_frame(None, now)?
                        }
                    };
                    summary.events_published += self.publish(events);
                }
                _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                    let events = self.pipeline.advance(started.elapsed());
                    summary.events_published += self.publish(events);
                }
            }
        }

        // Stale items come due before a newer cycle's delivery; drain them all.
        while let Some(due) = self.pipeline.next_deadline() {
            tokio::time::sleep_until(started + due).await;
            let events = self.pipeline.advance(started.elapsed());
            summary.events_published += self.publish(events);
        }

        info!(
            frames = summary.frames_analysed,
            skipped = summary.frames_unavailable,
            events = summary.events_published,
            "frame stream finished"
        );
        Ok(summary)
    }

    fn publish(&self, events: Vec<AuraEvent>) -> u64 {
        let mut published = 0;
        for event in events {
            // An error only means nobody is subscribed right now.
            if self.bus.events_tx.send(event).is_err() {
                warn!("event dropped: no subscribers");
            }
            published += 1;
        }
        published
    }

    pub fn pipeline(&self) -> &AuraPipeline {
        &self.pipeline
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

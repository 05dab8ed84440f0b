// THEORY:
// Zone changes are delivered after a fixed delay so that flicker between two
// adjacent zones during a transition collapses into one event. The delay must
// not block frame analysis, so it is modeled as a deferred delivery that the
// owner polls with the current time.
//
// Key properties:
// 1.  **At most one pending delivery.** `schedule` refuses while one is
//     outstanding; the caller decides what a refused change means.
// 2.  **Injected time.** `now` is a `Duration` since the owning pipeline
//     started. Nothing here reads a clock, so tests advance virtual time
//     frame by frame instead of sleeping.
// 3.  **No cancellation, only staleness.** `reset` does not remove the pending
//     item; it bumps a generation counter. The item still comes due and is
//     returned as `Delivery::Stale`, letting the owner skip its observable
//     effect. A stale item never clears the pending slot of a newer cycle.
//     Stale items are bounded by the resets made within one `delay`, since
//     each is dropped at its own deadline.

use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    due: Duration,
    generation: u64,
    payload: T,
}

/// A due item, tagged with whether the state that scheduled it still stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<T> {
    Fresh(T),
    Stale(T),
}

/// A single-slot deferred delivery driven by caller-supplied time.
#[derive(Debug, Clone)]
pub struct DebounceTimer<T> {
    delay: Duration,
    generation: u64,
    /// Scheduled deliveries that have not yet come due, oldest first. Holds at
    /// most one item of the current generation; every other entry is stale,
    /// left by a `reset` less than `delay` ago, and leaves on its own deadline.
    queue: Vec<Pending<T>>,
}

impl<T> DebounceTimer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            queue: Vec::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a delivery of the current generation is outstanding.
    pub fn is_pending(&self) -> bool {
        self.queue.iter().any(|pending| pending.generation == self.generation)
    }

    /// Schedules `payload` for `now + delay`. Returns false, dropping the
    /// payload, if a delivery of the current generation is still pending.
    pub fn schedule(&mut self, now: Duration, payload: T) -> bool {
        if self.is_pending() {
            return false;
        }
        self.queue.push(Pending {
            due: now + self.delay,
            generation: self.generation,
            payload,
        });
        true
    }

    /// Marks everything outstanding as stale and frees the slot.
    pub fn reset(&mut self) {
        self.generation += 1;
    }

    /// The earliest instant at which `poll` will return something.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.iter().map(|pending| pending.due).min()
    }

    /// Removes and returns every item due at `now`, in scheduling order.
    pub fn poll(&mut self, now: Duration) -> Vec<Delivery<T>> {
        let generation = self.generation;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|pending| pending.due <= now);
        self.queue = waiting;

        due.into_iter()
            .map(|pending| {
                if pending.generation == generation {
                    Delivery::Fresh(pending.payload)
                } else {
                    Delivery::Stale(pending.payload)
                }
            })
            .collect()
    }
}

use super::error::{SimulationError, SimulationResult};
use super::event::Event;
use super::types::SimTime;
use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct ScheduledEvent {
    sequence_num: u64,
    event: Event,
}

impl ScheduledEvent {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.event
            .time
            .total_cmp(&other.event.time)
            .then_with(|| {
                self.event
                    .kind
                    .dispatch_priority()
                    .cmp(&other.event.kind.dispatch_priority())
            })
            .then_with(|| self.sequence_num.cmp(&other.sequence_num))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other.key_cmp(self)
    }
}

/// Pending events ordered by `(time, dispatch priority, insertion order)`
///
/// Insertion order only breaks ties between events of the same kind at the
/// same instant, which keeps dispatch fully deterministic.
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
    last_dispatched: SimTime,
}

impl EventScheduler {
    /// Create an empty scheduler positioned at time 0
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
            last_dispatched: 0.0,
        }
    }

    /// Schedule an event
    ///
    /// Fails if the event time is not a number or lies before the most
    /// recently dispatched event.
    pub fn schedule(&mut self, event: Event) -> SimulationResult<()> {
        if event.time.is_nan() {
            return Err(SimulationError::fault(format!(
                "event {:?} scheduled at NaN time",
                event.kind
            )));
        }
        if event.time < self.last_dispatched {
            return Err(SimulationError::fault(format!(
                "event {:?} scheduled at {} before current time {}",
                event.kind, event.time, self.last_dispatched
            )));
        }

        trace!("Scheduling {:?} at {:.4}", event.kind, event.time);
        self.event_queue.push(ScheduledEvent {
            sequence_num: self.sequence_counter,
            event,
        });
        self.sequence_counter += 1;
        Ok(())
    }

    /// Remove and return the earliest pending event
    pub fn pop_earliest(&mut self) -> SimulationResult<Option<Event>> {
        let Some(scheduled) = self.event_queue.pop() else {
            return Ok(None);
        };
        let event = scheduled.event;
        if event.time < self.last_dispatched {
            return Err(SimulationError::fault(format!(
                "event {:?} at {} dispatched after time {}",
                event.kind, event.time, self.last_dispatched
            )));
        }
        self.last_dispatched = event.time;
        Ok(Some(event))
    }

    /// Time of the earliest pending event without removing it
    pub fn peek_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|scheduled| scheduled.event.time)
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Time of the most recently dispatched event
    pub fn current_time(&self) -> SimTime {
        self.last_dispatched
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

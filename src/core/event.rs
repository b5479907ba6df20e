use super::types::{ServerId, SimTime};

/// What happens when an event is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new customer enters the system
    Arrival,
    /// The given server finishes serving its current customer
    ServiceCompletion(ServerId),
}

impl EventKind {
    /// Rank among events sharing the same timestamp; lower dispatches first.
    ///
    /// Completions go before arrivals so a server freed at `t` is visible to a
    /// customer arriving at `t`.
    pub fn dispatch_priority(&self) -> u8 {
        match self {
            EventKind::ServiceCompletion(_) => 0,
            EventKind::Arrival => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}

impl Event {
    pub fn arrival(time: SimTime) -> Self {
        Self {
            time,
            kind: EventKind::Arrival,
        }
    }

    pub fn service_completion(time: SimTime, server_id: ServerId) -> Self {
        Self {
            time,
            kind: EventKind::ServiceCompletion(server_id),
        }
    }
}

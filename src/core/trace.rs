use serde::{Deserialize, Serialize};

use super::runner::RunnerState;
use super::statistics::SimulationReport;
use super::types::{CustomerId, ServerId, SimTime};

/// One step of a run, as seen from outside the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEntry {
    Arrived {
        customer: CustomerId,
        time: SimTime,
    },
    ServiceStarted {
        customer: CustomerId,
        server: ServerId,
        time: SimTime,
        waited: SimTime,
    },
    Departed {
        customer: CustomerId,
        server: ServerId,
        time: SimTime,
        system_time: SimTime,
    },
}

impl TraceEntry {
    pub fn time(&self) -> SimTime {
        match self {
            TraceEntry::Arrived { time, .. }
            | TraceEntry::ServiceStarted { time, .. }
            | TraceEntry::Departed { time, .. } => *time,
        }
    }
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEntry::Arrived { customer, time } => {
                write!(f, "{} arrives at {:.2}", customer, time)
            }
            TraceEntry::ServiceStarted {
                customer,
                server,
                time,
                waited,
            } => write!(
                f,
                "{} starts service on {} at {:.2} (waited {:.2})",
                customer, server, time, waited
            ),
            TraceEntry::Departed {
                customer,
                time,
                system_time,
                ..
            } => write!(
                f,
                "{} leaves at {:.2} (system time {:.2})",
                customer, time, system_time
            ),
        }
    }
}

/// Observer trait for simulation runs
///
/// Observers only watch; nothing they do feeds back into the run.
pub trait SimulationObserver: Send {
    /// Called for every dispatched step, in dispatch order
    fn on_trace(&mut self, entry: &TraceEntry);

    /// Called when the runner moves between lifecycle states
    fn on_state_change(&mut self, _state: RunnerState) {}

    /// Called once when the run reaches its horizon
    fn on_complete(&mut self, _report: &SimulationReport) {}
}

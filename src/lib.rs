pub mod core;

// Re-export commonly used types
pub use crate::core::batch::{simulate_replications, ReplicationSummary};
pub use crate::core::config::{
    ConcurrencyMode, ExecutionConfig, ExponentialSampler, ServiceDistribution, SimulationParams,
};
pub use crate::core::error::{SimulationError, SimulationResult};
pub use crate::core::random_stream::{DrawSource, RandomStream};
pub use crate::core::runner::{RunnerState, SimulationRunner};
pub use crate::core::statistics::SimulationReport;
pub use crate::core::trace::{SimulationObserver, TraceEntry};
pub use crate::core::types::{CustomerId, ServerId, SimTime};

/// Run one simulation with a freshly built runner
///
/// Fails with [`SimulationError::InvalidParameter`] before anything is
/// scheduled if `params` violates its constraints.
pub fn simulate(params: &SimulationParams) -> SimulationResult<SimulationReport> {
    SimulationRunner::new(params.clone())?.run()
}

//! Configuration for queueing simulation runs
//!
//! `SimulationParams` is the engine's call contract: everything a single run needs.
//! `ExecutionConfig` only controls how independent replications are scheduled onto threads.

use serde::{Deserialize, Serialize};

use super::error::{SimulationError, SimulationResult};

/// How service durations are produced when a customer is assigned a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceDistribution {
    /// Exponentially distributed with mean `service_time`. One draw per assignment.
    #[default]
    Exponential,
    /// Every customer takes exactly `service_time`. No random draw is made.
    Deterministic,
}

/// Algorithm used to turn uniform draws into exponential samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExponentialSampler {
    /// `-ln(1 - u) / rate` with one `f64` draw per sample. This is the frozen
    /// algorithm that golden outputs are recorded against.
    #[default]
    InverseTransform,
    /// `rand_distr::Exp` (ziggurat). Faster, but may consume a variable number of draws.
    Ziggurat,
}

/// Parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of parallel service stations
    pub n_servers: usize,
    /// Mean customer arrivals per time unit
    pub arrival_rate: f64,
    /// Mean service duration per customer
    pub service_time: f64,
    /// Simulated-time horizon
    pub sim_time: f64,
    /// Seed for the run's random stream. `None` seeds from entropy and is not reproducible.
    pub random_seed: Option<u64>,
    /// Record a trace of dispatched events in the report
    pub verbose: bool,
    pub service_distribution: ServiceDistribution,
    pub sampler: ExponentialSampler,
}

impl SimulationParams {
    /// Create parameters for a station with `n_servers` servers, seeded with the default seed
    pub fn new(n_servers: usize, arrival_rate: f64, service_time: f64, sim_time: f64) -> Self {
        Self {
            n_servers,
            arrival_rate,
            service_time,
            sim_time,
            ..Self::default()
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Seed from entropy instead of a fixed seed
    pub fn without_seed(mut self) -> Self {
        self.random_seed = None;
        self
    }

    /// Enable or disable the dispatched-event trace
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_service_distribution(mut self, distribution: ServiceDistribution) -> Self {
        self.service_distribution = distribution;
        self
    }

    pub fn with_sampler(mut self, sampler: ExponentialSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Check every constraint of the call contract
    ///
    /// Non-finite values are rejected alongside non-positive ones.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.n_servers < 1 {
            return Err(SimulationError::invalid(
                "n_servers",
                format!("must be >= 1, got {}", self.n_servers),
            ));
        }
        require_positive("arrival_rate", self.arrival_rate)?;
        require_positive("service_time", self.service_time)?;
        require_positive("sim_time", self.sim_time)?;
        Ok(())
    }
}

fn require_positive(name: &'static str, value: f64) -> SimulationResult<()> {
    if !value.is_finite() {
        return Err(SimulationError::invalid(
            name,
            format!("must be finite, got {}", value),
        ));
    }
    if value <= 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("must be > 0, got {}", value),
        ));
    }
    Ok(())
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            n_servers: 1,
            arrival_rate: 5.0,
            service_time: 3.0,
            sim_time: 50.0,
            random_seed: Some(42),
            verbose: false,
            service_distribution: ServiceDistribution::default(),
            sampler: ExponentialSampler::default(),
        }
    }
}

/// Enumeration of supported concurrency modes for replication batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Replications run one after another on the calling thread
    #[default]
    Sequential,
    /// Replications are spread over a Rayon thread pool
    Rayon,
}

/// Configuration for executing a batch of independent runs
///
/// Each run always owns its own runner and random stream; this only decides
/// which threads the runs land on.
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution.
    /// Only relevant when concurrency_mode is Rayon; `None` uses Rayon's default.
    pub thread_pool_size: Option<usize>,
}

impl ExecutionConfig {
    /// Create a sequential configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_service_defaults() {
        let params = SimulationParams::default();
        assert_eq!(params.n_servers, 1);
        assert_eq!(params.arrival_rate, 5.0);
        assert_eq!(params.service_time, 3.0);
        assert_eq!(params.sim_time, 50.0);
        assert_eq!(params.random_seed, Some(42));
        assert!(!params.verbose);
        assert_eq!(params.service_distribution, ServiceDistribution::Exponential);
        assert_eq!(params.sampler, ExponentialSampler::InverseTransform);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_builder() {
        let params = SimulationParams::new(3, 1.5, 0.5, 100.0)
            .with_seed(7)
            .with_verbose(true)
            .with_service_distribution(ServiceDistribution::Deterministic)
            .with_sampler(ExponentialSampler::Ziggurat);

        assert_eq!(params.n_servers, 3);
        assert_eq!(params.random_seed, Some(7));
        assert!(params.verbose);
        assert_eq!(params.service_distribution, ServiceDistribution::Deterministic);
        assert_eq!(params.sampler, ExponentialSampler::Ziggurat);
        assert_eq!(params.without_seed().random_seed, None);
    }

    #[test]
    fn test_validate_rejects_zero_servers() {
        let err = SimulationParams::new(0, 1.0, 1.0, 10.0).validate().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidParameter { name: "n_servers", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let cases = [
            (SimulationParams::new(1, 0.0, 1.0, 10.0), "arrival_rate"),
            (SimulationParams::new(1, -2.0, 1.0, 10.0), "arrival_rate"),
            (SimulationParams::new(1, 1.0, 0.0, 10.0), "service_time"),
            (SimulationParams::new(1, 1.0, 1.0, -1.0), "sim_time"),
            (SimulationParams::new(1, f64::NAN, 1.0, 10.0), "arrival_rate"),
            (SimulationParams::new(1, 1.0, f64::INFINITY, 10.0), "service_time"),
        ];
        for (params, expected) in cases {
            match params.validate() {
                Err(SimulationError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_execution_config_builder() {
        let config = ExecutionConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);

        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(ExecutionConfig::default().concurrency_mode, ConcurrencyMode::Sequential);
    }
}

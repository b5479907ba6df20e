//! Independent replications of the same station under different seeds.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{ConcurrencyMode, ExecutionConfig, SimulationParams};
use super::error::{SimulationError, SimulationResult};
use super::runner::SimulationRunner;
use super::statistics::SimulationReport;

/// Run `params` once per seed, returning reports in seed order
///
/// Every replication gets a freshly built runner, so results are identical
/// to running each seed on its own regardless of the concurrency mode.
pub fn simulate_replications(
    params: &SimulationParams,
    seeds: &[u64],
    config: &ExecutionConfig,
) -> SimulationResult<Vec<SimulationReport>> {
    params.validate()?;
    info!(
        "Running {} replication(s) in {:?} mode",
        seeds.len(),
        config.concurrency_mode
    );

    let run_one =
        |seed: u64| SimulationRunner::new(params.clone().with_seed(seed))?.run();

    match config.concurrency_mode {
        ConcurrencyMode::Sequential => seeds.iter().map(|&seed| run_one(seed)).collect(),
        ConcurrencyMode::Rayon => {
            // 0 lets Rayon pick the thread count
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.thread_pool_size.unwrap_or(0))
                .build()
                .map_err(|e| SimulationError::ThreadPool(e.to_string()))?;
            pool.install(|| seeds.par_iter().map(|&seed| run_one(seed)).collect())
        }
    }
}

/// Cross-replication means of the headline statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub mean_total_customers: f64,
    pub mean_avg_wait_time: f64,
    pub mean_avg_system_time: f64,
    /// Sample standard deviation of the per-replication average wait; 0.0 with fewer than two
    pub std_dev_avg_wait_time: f64,
}

impl ReplicationSummary {
    /// Summarize a set of reports; `None` when there are none
    pub fn from_reports(reports: &[SimulationReport]) -> Option<Self> {
        if reports.is_empty() {
            return None;
        }
        let n = reports.len() as f64;
        let mean = |f: fn(&SimulationReport) -> f64| reports.iter().map(f).sum::<f64>() / n;

        let mean_avg_wait_time = mean(|r| r.avg_wait_time);
        let std_dev_avg_wait_time = if reports.len() > 1 {
            let squares: f64 = reports
                .iter()
                .map(|r| (r.avg_wait_time - mean_avg_wait_time).powi(2))
                .sum();
            (squares / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Some(Self {
            replications: reports.len(),
            mean_total_customers: mean(|r| r.total_customers as f64),
            mean_avg_wait_time,
            mean_avg_system_time: mean(|r| r.avg_system_time),
            std_dev_avg_wait_time,
        })
    }
}

use log::error;
use serde::{Deserialize, Serialize};

use super::error::{SimulationError, SimulationResult};
use super::trace::TraceEntry;
use super::types::{Customer, SimTime};

/// Averages over every customer that departed within the horizon
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub total_customers: u64,
    pub avg_wait_time: f64,
    pub avg_system_time: f64,
    /// Longest wait among those customers
    pub max_wait_time: f64,
}

/// Running totals folded from departing customers
///
/// Only sums and counts are kept, so memory stays flat however long the run.
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    customers_served: u64,
    total_wait_time: f64,
    total_system_time: f64,
    max_wait_time: f64,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a departed customer into the totals
    ///
    /// Takes the customer by value: once recorded it is gone.
    pub fn record_completion(&mut self, customer: Customer) -> SimulationResult<()> {
        let (Some(wait_time), Some(system_time)) = (customer.wait_time(), customer.system_time())
        else {
            return Err(inconsistent(format!(
                "{} recorded without service start or departure time",
                customer.id
            )));
        };

        if wait_time.is_nan() || wait_time < 0.0 {
            return Err(inconsistent(format!(
                "{} has negative wait time {}",
                customer.id, wait_time
            )));
        }
        if system_time.is_nan() || system_time < wait_time {
            return Err(inconsistent(format!(
                "{} has system time {} shorter than wait time {}",
                customer.id, system_time, wait_time
            )));
        }

        self.customers_served += 1;
        self.total_wait_time += wait_time;
        self.total_system_time += system_time;
        self.max_wait_time = self.max_wait_time.max(wait_time);
        Ok(())
    }

    pub fn customers_served(&self) -> u64 {
        self.customers_served
    }

    /// Compute the averages; both are 0.0 when nobody completed
    pub fn finalize(&self) -> CompletionSummary {
        if self.customers_served == 0 {
            return CompletionSummary::default();
        }
        let n = self.customers_served as f64;
        CompletionSummary {
            total_customers: self.customers_served,
            avg_wait_time: self.total_wait_time / n,
            avg_system_time: self.total_system_time / n,
            max_wait_time: self.max_wait_time,
        }
    }
}

fn inconsistent(message: String) -> SimulationError {
    error!("{}", message);
    SimulationError::fault(message)
}

/// Final output of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Customers whose service completed at or before the horizon
    pub total_customers: u64,
    /// Mean of (service start - arrival) over those customers
    pub avg_wait_time: f64,
    /// Mean of (departure - arrival) over those customers
    pub avg_system_time: f64,
    /// Longest wait among those customers
    pub max_wait_time: f64,
    /// Customers whose arrival was dispatched, served or not
    pub customers_arrived: u64,
    /// Customers still waiting or in service when the horizon was reached
    pub customers_in_system_at_horizon: u64,
    /// Longest the waiting line grew during the run
    pub peak_queue_length: usize,
    /// Seed the run's random stream used
    pub random_seed: u64,
    /// Time of the last dispatched event
    pub final_time: SimTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEntry>,
}

impl SimulationReport {
    /// Copy of the report with averages rounded to `places` decimal places
    pub fn rounded(&self, places: u32) -> Self {
        let factor = 10f64.powi(places as i32);
        let round = |value: f64| (value * factor).round() / factor;
        Self {
            avg_wait_time: round(self.avg_wait_time),
            avg_system_time: round(self.avg_system_time),
            max_wait_time: round(self.max_wait_time),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CustomerId;

    fn served(id: u64, arrival: f64, start: f64, departure: f64) -> Customer {
        let mut customer = Customer::new(CustomerId(id), arrival);
        customer.service_start_time = Some(start);
        customer.departure_time = Some(departure);
        customer
    }

    #[test]
    fn test_empty_collector_reports_zeros() {
        let summary = StatisticsCollector::new().finalize();
        assert_eq!(summary.total_customers, 0);
        assert_eq!(summary.avg_wait_time, 0.0);
        assert_eq!(summary.avg_system_time, 0.0);
    }

    #[test]
    fn test_averages() {
        let mut stats = StatisticsCollector::new();
        stats.record_completion(served(0, 0.0, 0.0, 2.0)).unwrap();
        stats.record_completion(served(1, 1.0, 2.0, 5.0)).unwrap();
        stats.record_completion(served(2, 1.5, 5.0, 6.0)).unwrap();

        let summary = stats.finalize();
        assert_eq!(summary.total_customers, 3);
        assert!((summary.avg_wait_time - 1.5).abs() < 1e-12);
        assert!((summary.avg_system_time - (2.0 + 4.0 + 4.5) / 3.0).abs() < 1e-12);
        assert_eq!(summary.max_wait_time, 3.5);
    }

    #[test]
    fn test_negative_wait_is_a_fault() {
        let mut stats = StatisticsCollector::new();
        let err = stats.record_completion(served(0, 3.0, 2.0, 4.0)).unwrap_err();
        assert!(matches!(err, SimulationError::InternalConsistencyFault(_)));
        assert_eq!(stats.customers_served(), 0);
    }

    #[test]
    fn test_departure_before_service_start_is_a_fault() {
        let mut stats = StatisticsCollector::new();
        assert!(stats.record_completion(served(0, 0.0, 2.0, 1.0)).is_err());
    }

    #[test]
    fn test_missing_timestamps_is_a_fault() {
        let mut stats = StatisticsCollector::new();
        let customer = Customer::new(CustomerId(0), 1.0);
        assert!(stats.record_completion(customer).is_err());
    }

    #[test]
    fn test_rounded_report() {
        let report = SimulationReport {
            total_customers: 3,
            avg_wait_time: 1.23456,
            avg_system_time: 4.98765,
            max_wait_time: 2.0049,
            customers_arrived: 4,
            customers_in_system_at_horizon: 1,
            peak_queue_length: 2,
            random_seed: 42,
            final_time: 9.5,
            trace: Vec::new(),
        };
        let rounded = report.rounded(2);
        assert_eq!(rounded.avg_wait_time, 1.23);
        assert_eq!(rounded.avg_system_time, 4.99);
        assert_eq!(rounded.max_wait_time, 2.0);
        assert_eq!(rounded.total_customers, 3);
    }
}

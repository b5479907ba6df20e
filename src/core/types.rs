use serde::{Deserialize, Serialize};

/// Simulated time in abstract time units
pub type SimTime = f64;

/// Sequence number of a customer, assigned in arrival order starting at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Customer {}", self.0)
    }
}

/// Index of a server in the pool, `0..n_servers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerId(pub usize);

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Server {}", self.0)
    }
}

/// A customer moving through the station
///
/// Created when its arrival is dispatched, dropped once its metrics are folded
/// into the statistics collector.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub arrival_time: SimTime,
    pub service_start_time: Option<SimTime>,
    pub departure_time: Option<SimTime>,
}

impl Customer {
    pub fn new(id: CustomerId, arrival_time: SimTime) -> Self {
        Self {
            id,
            arrival_time,
            service_start_time: None,
            departure_time: None,
        }
    }

    /// Time spent in the waiting line, once service has started
    pub fn wait_time(&self) -> Option<SimTime> {
        self.service_start_time.map(|start| start - self.arrival_time)
    }

    /// Time from arrival to departure, once the customer has departed
    pub fn system_time(&self) -> Option<SimTime> {
        self.departure_time.map(|end| end - self.arrival_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_times_unset_until_recorded() {
        let mut customer = Customer::new(CustomerId(0), 1.5);
        assert_eq!(customer.wait_time(), None);
        assert_eq!(customer.system_time(), None);

        customer.service_start_time = Some(2.0);
        customer.departure_time = Some(4.5);
        assert_eq!(customer.wait_time(), Some(0.5));
        assert_eq!(customer.system_time(), Some(3.0));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(CustomerId(3).to_string(), "Customer 3");
        assert_eq!(ServerId(1).to_string(), "Server 1");
    }
}

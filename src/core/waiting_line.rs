use super::types::Customer;
use std::collections::VecDeque;

/// Unbounded first-come-first-served line of customers waiting for a server
#[derive(Debug, Default)]
pub struct WaitingLine {
    customers: VecDeque<Customer>,
    peak_length: usize,
}

impl WaitingLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a customer to the back of the line
    pub fn enqueue(&mut self, customer: Customer) {
        self.customers.push_back(customer);
        self.peak_length = self.peak_length.max(self.customers.len());
    }

    /// Remove the customer at the head of the line
    pub fn dequeue(&mut self) -> Option<Customer> {
        self.customers.pop_front()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Longest the line has been
    pub fn peak_length(&self) -> usize {
        self.peak_length
    }
}

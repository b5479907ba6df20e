use super::error::{SimulationError, SimulationResult};
use super::random_stream::DrawSource;
use super::types::{Customer, CustomerId, ServerId, SimTime};
use super::waiting_line::WaitingLine;

/// Occupancy of a single server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerStatus {
    Free,
    Busy {
        customer: Customer,
        completion_time: SimTime,
    },
}

#[derive(Debug, Clone)]
pub struct Server {
    pub id: ServerId,
    pub status: ServerStatus,
}

impl Server {
    pub fn is_free(&self) -> bool {
        matches!(self.status, ServerStatus::Free)
    }
}

/// A customer placed on a server; the caller schedules its completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub server_id: ServerId,
    pub customer_id: CustomerId,
    pub start_time: SimTime,
    pub wait_time: SimTime,
    pub completion_time: SimTime,
}

/// Result of offering a newly arrived customer to the pool
#[derive(Debug)]
pub enum AssignOutcome {
    Assigned(Assignment),
    /// Every server is busy; the customer is handed back to be queued
    AllBusy(Customer),
}

/// Result of a server finishing its customer
#[derive(Debug)]
pub struct Release {
    pub server_id: ServerId,
    /// The customer that just departed
    pub departed: CustomerId,
    pub system_time: SimTime,
    /// The head of the waiting line, now in service on the same server
    pub next: Option<Assignment>,
}

/// Up to `capacity` servers, scanned in ascending id order
///
/// Server records are only created once every existing one is busy, so memory
/// follows peak occupancy rather than capacity.
pub struct ServerPool {
    servers: Vec<Server>,
    capacity: usize,
}

impl ServerPool {
    /// Create a pool that can hold `capacity` servers, all free
    pub fn new(capacity: usize) -> Self {
        Self {
            servers: Vec::new(),
            capacity,
        }
    }

    /// Put `customer` on the lowest-numbered free server
    ///
    /// A service duration is drawn only when a server is actually available.
    pub fn try_assign(
        &mut self,
        customer: Customer,
        time: SimTime,
        draws: &mut dyn DrawSource,
    ) -> SimulationResult<AssignOutcome> {
        let index = match self.servers.iter().position(Server::is_free) {
            Some(index) => index,
            None if self.servers.len() < self.capacity => {
                let index = self.servers.len();
                self.servers.push(Server {
                    id: ServerId(index),
                    status: ServerStatus::Free,
                });
                index
            }
            None => return Ok(AssignOutcome::AllBusy(customer)),
        };
        let assignment = self.occupy(index, customer, time, draws)?;
        Ok(AssignOutcome::Assigned(assignment))
    }

    /// Finish `server_id`'s customer at `time` and hand the server straight to
    /// the head of `line`, if any
    ///
    /// `record` receives the departed customer before the server is reassigned;
    /// if it fails, the line and the draw stream are left untouched.
    pub fn release<F>(
        &mut self,
        server_id: ServerId,
        time: SimTime,
        line: &mut WaitingLine,
        draws: &mut dyn DrawSource,
        record: F,
    ) -> SimulationResult<Release>
    where
        F: FnOnce(Customer) -> SimulationResult<()>,
    {
        let server = self.servers.get_mut(server_id.0).ok_or_else(|| {
            SimulationError::fault(format!("release of unknown {}", server_id))
        })?;

        let (mut departed, completion_time) =
            match std::mem::replace(&mut server.status, ServerStatus::Free) {
                ServerStatus::Busy {
                    customer,
                    completion_time,
                } => (customer, completion_time),
                ServerStatus::Free => {
                    return Err(SimulationError::fault(format!(
                        "{} completed service while free",
                        server_id
                    )))
                }
            };

        if completion_time != time {
            return Err(SimulationError::fault(format!(
                "{} scheduled to complete at {} but completed at {}",
                server_id, completion_time, time
            )));
        }
        departed.departure_time = Some(time);
        let departed_id = departed.id;
        let system_time = time - departed.arrival_time;
        record(departed)?;

        let next = match line.dequeue() {
            Some(waiting) => Some(self.occupy(server_id.0, waiting, time, draws)?),
            None => None,
        };

        Ok(Release {
            server_id,
            departed: departed_id,
            system_time,
            next,
        })
    }

    fn occupy(
        &mut self,
        index: usize,
        mut customer: Customer,
        time: SimTime,
        draws: &mut dyn DrawSource,
    ) -> SimulationResult<Assignment> {
        if time < customer.arrival_time {
            return Err(SimulationError::fault(format!(
                "{} starts service at {} before arriving at {}",
                customer.id, time, customer.arrival_time
            )));
        }

        let service_duration = draws.next_service_time()?;
        let completion_time = time + service_duration;
        customer.service_start_time = Some(time);

        let assignment = Assignment {
            server_id: ServerId(index),
            customer_id: customer.id,
            start_time: time,
            wait_time: time - customer.arrival_time,
            completion_time,
        };
        self.servers[index].status = ServerStatus::Busy {
            customer,
            completion_time,
        };
        Ok(assignment)
    }

    pub fn busy_count(&self) -> usize {
        self.servers.iter().filter(|server| !server.is_free()).count()
    }
}

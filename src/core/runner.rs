//! Event loop driving a single multi-server station from time 0 to the horizon.
//!
//! A runner is built, run once, and consumed. Every run owns its scheduler,
//! server pool, waiting line, statistics and draw source, so concurrent runs
//! never share mutable state.

use log::{debug, error, info};
use uuid::Uuid;

use super::config::SimulationParams;
use super::error::{SimulationError, SimulationResult};
use super::event::{Event, EventKind};
use super::event_scheduler::EventScheduler;
use super::random_stream::{DrawSource, RandomStream};
use super::server_pool::{AssignOutcome, Assignment, ServerPool};
use super::statistics::{SimulationReport, StatisticsCollector};
use super::trace::{SimulationObserver, TraceEntry};
use super::types::{Customer, CustomerId, ServerId, SimTime};
use super::waiting_line::WaitingLine;

/// Lifecycle of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Parameters validated, nothing scheduled yet
    Initialized,
    /// Dispatching events
    Running,
    /// Horizon reached; results are final
    Completed,
}

pub struct SimulationRunner<D: DrawSource = RandomStream> {
    run_id: Uuid,
    params: SimulationParams,
    seed: u64,
    draws: D,
    scheduler: EventScheduler,
    pool: ServerPool,
    line: WaitingLine,
    stats: StatisticsCollector,
    state: RunnerState,
    customers_arrived: u64,
    trace: Vec<TraceEntry>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationRunner<RandomStream> {
    /// Validate `params` and build a runner with its own seeded random stream
    pub fn new(params: SimulationParams) -> SimulationResult<Self> {
        params.validate()?;
        let draws = RandomStream::from_params(&params);
        let seed = draws.seed();
        Ok(Self::build(params, seed, draws))
    }
}

impl<D: DrawSource> SimulationRunner<D> {
    /// Validate `params` and build a runner that takes its durations from `draws`
    ///
    /// The report's seed is `params.random_seed`, or 0 when none is set.
    pub fn with_draw_source(params: SimulationParams, draws: D) -> SimulationResult<Self> {
        params.validate()?;
        let seed = params.random_seed.unwrap_or(0);
        Ok(Self::build(params, seed, draws))
    }

    fn build(params: SimulationParams, seed: u64, draws: D) -> Self {
        let pool = ServerPool::new(params.n_servers);
        Self {
            run_id: Uuid::new_v4(),
            params,
            seed,
            draws,
            scheduler: EventScheduler::new(),
            pool,
            line: WaitingLine::new(),
            stats: StatisticsCollector::new(),
            state: RunnerState::Initialized,
            customers_arrived: 0,
            trace: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Add an observer to the run
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Run to the horizon and return the final report
    ///
    /// Events scheduled after `sim_time` are never dispatched, so customers
    /// still waiting or in service at the horizon are excluded from the averages.
    pub fn run(mut self) -> SimulationResult<SimulationReport> {
        info!(
            "[Run {}] Starting: {} server(s), arrival rate {}, service {}, horizon {}, seed {}",
            self.run_id,
            self.params.n_servers,
            self.params.arrival_rate,
            self.params.service_time,
            self.params.sim_time,
            self.seed
        );

        self.transition(RunnerState::Running);
        let first_arrival = self.draws.next_interarrival_time()?;
        self.scheduler.schedule(Event::arrival(first_arrival))?;

        let run_id = self.run_id;
        let horizon = self.params.sim_time;
        let mut events_dispatched: u64 = 0;
        while let Some(next_time) = self.scheduler.peek_time() {
            if next_time > horizon {
                break;
            }
            let Some(event) = self.scheduler.pop_earliest()? else {
                break;
            };
            self.dispatch(event).map_err(|e| {
                error!("[Run {}] Aborting at {:.4}: {}", run_id, event.time, e);
                e
            })?;
            events_dispatched += 1;
        }
        self.transition(RunnerState::Completed);

        let report = self.finish()?;
        info!(
            "[Run {}] Done after {} events: {} served, wait {:.4}, system {:.4}, {} in system",
            self.run_id,
            events_dispatched,
            report.total_customers,
            report.avg_wait_time,
            report.avg_system_time,
            report.customers_in_system_at_horizon
        );
        for observer in &mut self.observers {
            observer.on_complete(&report);
        }
        Ok(report)
    }

    fn transition(&mut self, state: RunnerState) {
        debug!("[Run {}] {:?} -> {:?}", self.run_id, self.state, state);
        self.state = state;
        for observer in &mut self.observers {
            observer.on_state_change(state);
        }
    }

    fn dispatch(&mut self, event: Event) -> SimulationResult<()> {
        match event.kind {
            EventKind::Arrival => self.handle_arrival(event.time),
            EventKind::ServiceCompletion(server_id) => {
                self.handle_completion(server_id, event.time)
            }
        }
    }

    fn handle_arrival(&mut self, time: SimTime) -> SimulationResult<()> {
        let customer = Customer::new(CustomerId(self.customers_arrived), time);
        self.customers_arrived += 1;
        self.emit(TraceEntry::Arrived {
            customer: customer.id,
            time,
        });

        // The next arrival is independent of what happens to this one
        let gap = self.draws.next_interarrival_time()?;
        self.scheduler.schedule(Event::arrival(time + gap))?;

        match self.pool.try_assign(customer, time, &mut self.draws)? {
            AssignOutcome::Assigned(assignment) => self.begin_service(assignment),
            AssignOutcome::AllBusy(customer) => {
                debug!(
                    "[Run {}] {} waits behind {} other(s)",
                    self.run_id,
                    customer.id,
                    self.line.len()
                );
                self.line.enqueue(customer);
                Ok(())
            }
        }
    }

    fn handle_completion(&mut self, server_id: ServerId, time: SimTime) -> SimulationResult<()> {
        let stats = &mut self.stats;
        let release = self.pool.release(
            server_id,
            time,
            &mut self.line,
            &mut self.draws,
            |departed| stats.record_completion(departed),
        )?;

        self.emit(TraceEntry::Departed {
            customer: release.departed,
            server: release.server_id,
            time,
            system_time: release.system_time,
        });

        match release.next {
            Some(assignment) => self.begin_service(assignment),
            None => Ok(()),
        }
    }

    fn begin_service(&mut self, assignment: Assignment) -> SimulationResult<()> {
        self.emit(TraceEntry::ServiceStarted {
            customer: assignment.customer_id,
            server: assignment.server_id,
            time: assignment.start_time,
            waited: assignment.wait_time,
        });
        self.scheduler.schedule(Event::service_completion(
            assignment.completion_time,
            assignment.server_id,
        ))
    }

    fn emit(&mut self, entry: TraceEntry) {
        debug!("[Run {}] {}", self.run_id, entry);
        for observer in &mut self.observers {
            observer.on_trace(&entry);
        }
        if self.params.verbose {
            self.trace.push(entry);
        }
    }

    fn finish(&mut self) -> SimulationResult<SimulationReport> {
        let summary = self.stats.finalize();
        let in_system = (self.line.len() + self.pool.busy_count()) as u64;
        if summary.total_customers + in_system != self.customers_arrived {
            return Err(SimulationError::fault(format!(
                "{} arrived but {} served and {} still in system",
                self.customers_arrived, summary.total_customers, in_system
            )));
        }

        Ok(SimulationReport {
            total_customers: summary.total_customers,
            avg_wait_time: summary.avg_wait_time,
            avg_system_time: summary.avg_system_time,
            max_wait_time: summary.max_wait_time,
            customers_arrived: self.customers_arrived,
            customers_in_system_at_horizon: in_system,
            peak_queue_length: self.line.peak_length(),
            random_seed: self.seed,
            final_time: self.scheduler.current_time(),
            trace: std::mem::take(&mut self.trace),
        })
    }
}

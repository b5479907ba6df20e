pub mod batch;
pub mod config;
pub mod error;
pub mod event;
pub mod event_scheduler;
pub mod random_stream;
pub mod runner;
pub mod server_pool;
pub mod statistics;
pub mod trace;
pub mod types;
pub mod waiting_line;

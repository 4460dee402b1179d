pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod rate_limiter;
pub mod server;
pub mod tasks;
pub mod types;

// Ports for external collaborators and their adapters
pub mod app;
pub mod infra;

pub mod cli;
pub mod collectors;
pub mod config;
pub mod error;
pub mod period;
pub mod pipeline;
pub mod telemetry;

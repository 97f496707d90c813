pub mod cancel;
pub mod config;
pub mod orchestrator;
pub mod rate;
pub mod retry;
pub mod schedule;

pub mod api;
pub mod check;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod repo;
pub mod runner;
pub mod scenario;
pub mod state;
pub mod summary;
pub mod telemetry;

pub mod config;
pub mod dart;
pub mod error;
pub mod host;
pub mod models;
pub mod orchestrator;
pub mod plugin;
pub mod simulation;

pub mod plugin;
pub mod scoring;
pub mod types;

pub mod config;
pub mod logging;

// Orchestrator modules
pub mod coordinator;
pub mod error;
pub mod events;
pub mod gate;
pub mod messages;
pub mod platform;
pub mod runner;
pub mod session;
pub mod store;
pub mod sweeper;
pub mod transport;

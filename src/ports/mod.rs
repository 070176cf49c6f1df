//! Port traits at the I/O seams of the simulation.

pub mod config_port;
pub mod history_port;

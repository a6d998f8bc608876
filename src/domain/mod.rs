//! Domain layer - Volume records and port definitions
//!
//! This module defines the records flowing through the inventory and the
//! trait (port) that the Kubernetes and AWS adapters implement.

pub mod ports;

pub use ports::*;

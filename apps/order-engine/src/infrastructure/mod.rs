//! Infrastructure Layer
//!
//! Adapters for the ports and repositories defined further in:
//!
//! - `persistence/`: In-memory repositories for orders, positions and signals
//! - `journal`: JSON-lines command journal and its replay
//! - `container`: Wiring of repositories, publisher and services

pub mod container;
pub mod journal;
pub mod persistence;

pub use container::{Container, InMemoryOrderService};

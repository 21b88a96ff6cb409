//! A ticket node: its identity, its signing key and the services it is wired
//! to, plus the building blocks the ticket flows are made of.

pub mod collect_signatures;
pub mod config;
pub mod error;
pub mod finality;
pub mod node;
pub mod parties;
pub mod progress;
pub mod vault;

#[cfg(test)]
mod testutils;

pub use error::FlowError;
pub use node::{Node, NodeServices};
pub use progress::{ProgressTracker, Stage};

//! In-process stand-ins for the services a ticket node trusts: the notary
//! and the network it talks over.

pub mod network;
pub mod notary;

pub use network::{Network, NetworkError};
pub use notary::Notary;

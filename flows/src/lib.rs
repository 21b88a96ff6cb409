//! The ticket flows: issuing a ticket (Buy), handing it to a new holder
//! (Transfer) and retiring it (Exit), with the responders that answer them.

pub mod api;
pub mod bootstrap;
pub mod buy;
pub mod exit;
pub mod responder;
pub mod sessions;
pub mod transfer;

pub use api::{FlowOutcome, TicketApi};
pub use bootstrap::start_node;

#[cfg(test)]
mod testutils;

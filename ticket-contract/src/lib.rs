//! The ticket contract: which transitions of a [`TicketState`] are legal.
//!
//! [`TicketState`]: ticket_type_rep::TicketState

pub mod command;
pub mod contract;
pub mod error;

pub use command::{Command, TicketCommand};
pub use contract::verify;
pub use error::{Rule, VerificationError};

//! Rust representations of the ticket asset and the identities that own it.

pub mod linear_id;
pub mod party;
pub mod section;
pub mod ticket_state;

pub use linear_id::LinearId;
pub use party::{KeyError, Party, PublicKey};
pub use ticket_state::TicketState;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ticket_type_rep::PublicKey;

/// The three things a transaction can do to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketCommand {
    Buy,
    Transfer,
    Exit,
}

impl fmt::Display for TicketCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketCommand::Buy => "Buy",
            TicketCommand::Transfer => "Transfer",
            TicketCommand::Exit => "Exit",
        };
        write!(f, "{}", name)
    }
}

/// A command together with the keys that must sign the transaction carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub value: TicketCommand,
    pub signers: BTreeSet<PublicKey>,
}

impl Command {
    pub fn new(value: TicketCommand, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Command {
            value,
            signers: signers.into_iter().collect(),
        }
    }
}

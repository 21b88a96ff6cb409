use serde::{Deserialize, Serialize};
use std::fmt;

use crate::linear_id::LinearId;
use crate::party::{Party, PublicKey};

/// One version of a ticket. Successive versions share a [`LinearId`].
///
/// Nothing here enforces the section tiers or `issuer != holder`; those are
/// contract rules and are checked when a transaction is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketState {
    pub issuer: Party,
    pub holder: Party,
    pub section: i32,
    pub linear_id: LinearId,
}

impl TicketState {
    /// A brand new ticket with a fresh linear id.
    pub fn new(issuer: Party, holder: Party, section: i32) -> Self {
        TicketState {
            issuer,
            holder,
            section,
            linear_id: LinearId::new(),
        }
    }

    /// The successor version handed to `new_holder`.
    pub fn with_holder(&self, new_holder: Party) -> Self {
        TicketState {
            holder: new_holder,
            ..self.clone()
        }
    }

    pub fn participants(&self) -> Vec<Party> {
        vec![self.issuer.clone(), self.holder.clone()]
    }

    pub fn participant_keys(&self) -> Vec<PublicKey> {
        self.participants().iter().map(Party::owning_key).collect()
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticket({}, issuer={}, holder={}, section={})",
            self.linear_id, self.issuer, self.holder, self.section
        )
    }
}

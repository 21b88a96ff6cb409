//! Services a node consumes and does not implement itself.
//!
//! The ledger's double-spend guarantee lives behind [`FinalityService`]; the
//! node only proposes transactions to it and observes the result.

use async_trait::async_trait;
use ticket_type_rep::{LinearId, Party};

use crate::messages::FlowKind;
use crate::session::{FlowSession, SessionError};
use crate::transaction::{SignedTransaction, StateAndRef, StateRef, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    Unconsumed,
    Consumed,
    All,
}

/// The node's own record of the ticket versions it has seen.
#[async_trait]
pub trait VaultService: Send + Sync {
    /// The current version of the ticket, if this node knows an unconsumed one.
    async fn find_unconsumed(&self, linear_id: &LinearId) -> Option<StateAndRef>;

    async fn query(&self, status: StateStatus) -> Vec<StateAndRef>;

    /// Marks the transaction's inputs consumed and stores its outputs.
    /// Recording the same transaction twice has no further effect.
    async fn record_transaction(&self, stx: &SignedTransaction);
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FinalityError {
    #[error("input {state_ref} was already consumed by transaction {consumed_by}")]
    Conflict {
        state_ref: StateRef,
        consumed_by: TransactionId,
    },
    #[error("transaction rejected by the notary: {reason}")]
    Rejected { reason: String },
    #[error("notary unavailable: {0}")]
    Unavailable(String),
}

impl FinalityError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, FinalityError::Conflict { .. })
    }
}

#[async_trait]
pub trait FinalityService: Send + Sync {
    /// Commits a fully signed transaction. At most one transaction consuming a
    /// given input ever succeeds.
    async fn notarise_and_record(
        &self,
        stx: &SignedTransaction,
    ) -> Result<TransactionId, FinalityError>;

    /// Whether a transaction with this id has been committed. Receivers ask
    /// before recording a transaction they were only told about.
    async fn is_committed(&self, id: &TransactionId) -> bool;
}

#[async_trait]
pub trait SessionMessaging: Send + Sync {
    /// Opens a session with `counterparty`, which starts the responder
    /// registered for `flow` on its side.
    async fn initiate_flow(
        &self,
        initiator: &Party,
        counterparty: &Party,
        flow: FlowKind,
    ) -> Result<FlowSession, SessionError>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn well_known_party_from_name(&self, name: &str) -> Option<Party>;

    async fn all_parties(&self) -> Vec<Party>;
}

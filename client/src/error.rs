use ledger_api::{BuilderError, FinalityError, SessionError, SignatureError, TransactionId};
use ticket_contract::VerificationError;
use ticket_type_rep::LinearId;

/// Why a ticket flow did not complete. None of these are retried here.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("no unconsumed ticket with linear id {0}")]
    StateNotFound(LinearId),
    #[error("{party} is not entitled to start this flow for ticket {linear_id}")]
    NotAParticipant { party: String, linear_id: LinearId },
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("{party} rejected the transaction: {reason}")]
    CounterpartyRejected { party: String, reason: String },
    #[error("{party} aborted the flow: {reason}")]
    Aborted { party: String, reason: String },
    #[error(transparent)]
    Finality(#[from] FinalityError),
    #[error("transaction {tx_id} was never notarised")]
    NotNotarised { tx_id: TransactionId },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Builder(#[from] BuilderError),
}

impl FlowError {
    /// Coarse category, for logs and for callers deciding whether to retry.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::Input(_)
            | FlowError::StateNotFound(_)
            | FlowError::NotAParticipant { .. }
            | FlowError::Builder(_) => "input",
            FlowError::Verification(_)
            | FlowError::Signature(_)
            | FlowError::NotNotarised { .. } => "verification",
            FlowError::CounterpartyRejected { .. } | FlowError::Aborted { .. } => {
                "counterparty-rejection"
            }
            FlowError::Finality(FinalityError::Conflict { .. }) => "finality-conflict",
            FlowError::Finality(_) | FlowError::Session(_) => "system",
        }
    }

    /// A conflict means the caller should re-query and try again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, FlowError::Finality(err) if err.is_conflict())
    }
}

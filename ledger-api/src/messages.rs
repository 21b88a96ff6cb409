use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transaction::{SignedTransaction, TransactionId, TransactionSignature};

/// Which initiating flow opened a session. The receiving node uses it to pick
/// the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Buy,
    Transfer,
    Exit,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowKind::Buy => "BuyFlow",
            FlowKind::Transfer => "TransferFlow",
            FlowKind::Exit => "ExitFlow",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMessage {
    /// A partially signed transaction the receiver is asked to countersign.
    Propose(SignedTransaction),
    Signature(TransactionSignature),
    Reject { reason: String },
    /// The notarised transaction, for the receiver to record.
    Finalized(SignedTransaction),
    /// The receiver checked and recorded the finalised transaction.
    Recorded(TransactionId),
    /// The initiator gave up after proposing.
    Aborted { reason: String },
}

impl FlowMessage {
    pub fn label(&self) -> &'static str {
        match self {
            FlowMessage::Propose(_) => "Propose",
            FlowMessage::Signature(_) => "Signature",
            FlowMessage::Reject { .. } => "Reject",
            FlowMessage::Finalized(_) => "Finalized",
            FlowMessage::Recorded(_) => "Recorded",
            FlowMessage::Aborted { .. } => "Aborted",
        }
    }
}

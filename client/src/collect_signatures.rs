use ledger_api::{FlowMessage, FlowSession, SignatureError, SignedTransaction, TransactionId};
use tracing::{info, warn};

use crate::finality::abort_sessions;
use crate::{FlowError, Node};

/// Sends the partially signed `stx` to every session's counterparty and waits
/// for each to countersign. The first rejection aborts the others and fails
/// the whole collection.
pub async fn collect_signatures(
    node: &Node,
    stx: SignedTransaction,
    sessions: &mut [FlowSession],
) -> Result<SignedTransaction, FlowError> {
    match gather(node, stx, sessions).await {
        Ok(stx) => Ok(stx),
        Err(err) => {
            abort_sessions(sessions, &err.to_string());
            Err(err)
        }
    }
}

async fn gather(
    node: &Node,
    mut stx: SignedTransaction,
    sessions: &mut [FlowSession],
) -> Result<SignedTransaction, FlowError> {
    let id = stx.id();
    for session in sessions.iter() {
        session.send(FlowMessage::Propose(stx.clone()))?;
    }
    for session in sessions.iter_mut() {
        let counterparty = session.counterparty().clone();
        match session.receive().await? {
            FlowMessage::Signature(sig) => {
                if sig.by != counterparty.owning_key() {
                    return Err(SignatureError::UnexpectedSigner { by: sig.by }.into());
                }
                sig.verify(&id)?;
                stx = stx.with_additional_signature(sig);
            }
            FlowMessage::Reject { reason } => {
                warn!(party = %counterparty, %reason, tx_id = %id, "Counterparty refused to sign");
                return Err(FlowError::CounterpartyRejected {
                    party: counterparty.to_string(),
                    reason,
                });
            }
            FlowMessage::Aborted { reason } => {
                return Err(FlowError::Aborted {
                    party: counterparty.to_string(),
                    reason,
                });
            }
            other => return Err(session.unexpected("Signature", &other).into()),
        }
    }
    stx.verify_required_signatures()?;
    info!(node = %node.our_identity(), tx_id = %id, "Collected all signatures");
    Ok(stx)
}

/// Countersigns a proposal received on `session`.
///
/// The proposer must already have signed, the contract must hold and `check`
/// must accept the transaction. Otherwise the proposer is sent a rejection and
/// the reason comes back as the error.
pub async fn sign_transaction<F>(
    node: &Node,
    session: &FlowSession,
    stx: SignedTransaction,
    check: F,
) -> Result<TransactionId, FlowError>
where
    F: FnOnce(&SignedTransaction) -> Result<(), String>,
{
    match check_proposal(node, session, &stx, check) {
        Ok(()) => {
            let id = stx.id();
            session.send(FlowMessage::Signature(node.create_signature(&stx)))?;
            info!(node = %node.our_identity(), tx_id = %id, "Signed transaction");
            Ok(id)
        }
        Err(err) => {
            warn!(node = %node.our_identity(), error = %err, "Rejecting proposal");
            // The initiator names us itself when it reports the rejection.
            let reason = match &err {
                FlowError::CounterpartyRejected { reason, .. } => reason.clone(),
                other => other.to_string(),
            };
            session.send(FlowMessage::Reject { reason })?;
            Err(err)
        }
    }
}

fn check_proposal<F>(
    node: &Node,
    session: &FlowSession,
    stx: &SignedTransaction,
    check: F,
) -> Result<(), FlowError>
where
    F: FnOnce(&SignedTransaction) -> Result<(), String>,
{
    let ours = node.our_key();
    if !stx.tx().required_signers().contains(&ours) {
        return Err(FlowError::CounterpartyRejected {
            party: node.our_identity().to_string(),
            reason: "we are not a required signer of this transaction".to_string(),
        });
    }
    // Everyone but the proposer may still be missing.
    let mut may_be_missing = stx.missing_signers();
    may_be_missing.remove(&session.counterparty().owning_key());
    stx.verify_signatures_except(&may_be_missing)?;
    stx.verify()?;
    check(stx).map_err(|reason| FlowError::CounterpartyRejected {
        party: node.our_identity().to_string(),
        reason,
    })
}

use ledger_api::{FlowMessage, FlowSession, SignedTransaction, TransactionId};
use tracing::{debug, error, info, warn};

use crate::{FlowError, Node};

/// Tells every counterparty that this flow will not finish.
pub fn abort_sessions(sessions: &[FlowSession], reason: &str) {
    for session in sessions {
        // A counterparty that already hung up has nothing left to hear.
        let _ = session.send(FlowMessage::Aborted {
            reason: reason.to_string(),
        });
    }
}

/// Notarises a fully signed transaction, records it in our vault, sends it
/// to every session's counterparty and waits until each has recorded it.
///
/// If notarisation fails nothing is recorded anywhere and the counterparties
/// are told the flow was aborted. Once notarised the transaction stands, so a
/// counterparty that fails to record it is only logged.
pub async fn finalise(
    node: &Node,
    stx: SignedTransaction,
    sessions: &mut [FlowSession],
) -> Result<SignedTransaction, FlowError> {
    if let Err(err) = stx.verify_required_signatures() {
        abort_sessions(sessions, &err.to_string());
        return Err(err.into());
    }
    let tx_id = match node.finality().notarise_and_record(&stx).await {
        Ok(tx_id) => tx_id,
        Err(err) => {
            error!(node = %node.our_identity(), tx_id = %stx.id(), error = %err, "Finality failed");
            abort_sessions(sessions, &err.to_string());
            return Err(err.into());
        }
    };
    node.vault().record_transaction(&stx).await;
    for session in sessions.iter() {
        if let Err(err) = session.send(FlowMessage::Finalized(stx.clone())) {
            warn!(%tx_id, error = %err, "Could not deliver finalised transaction");
        }
    }
    for session in sessions.iter_mut() {
        let counterparty = session.counterparty().clone();
        match session.receive().await {
            Ok(FlowMessage::Recorded(recorded)) if recorded == tx_id => {
                debug!(%tx_id, party = %counterparty, "Counterparty recorded transaction");
            }
            Ok(FlowMessage::Reject { reason }) => {
                warn!(%tx_id, party = %counterparty, %reason, "Counterparty refused to record transaction");
            }
            Ok(other) => {
                warn!(%tx_id, party = %counterparty, message = other.label(), "Unexpected reply to finalised transaction");
            }
            Err(err) => {
                warn!(%tx_id, party = %counterparty, error = %err, "No acknowledgement for finalised transaction");
            }
        }
    }
    info!(node = %node.our_identity(), %tx_id, "Transaction finalised");
    Ok(stx)
}

/// Waits for the initiator to send the finalised transaction and records it.
/// When `expected` is given the transaction must be the one we signed.
pub async fn receive_finality(
    node: &Node,
    session: &mut FlowSession,
    expected: Option<TransactionId>,
) -> Result<SignedTransaction, FlowError> {
    match session.receive().await? {
        FlowMessage::Finalized(stx) => record_finalised(node, session, stx, expected).await,
        FlowMessage::Aborted { reason } => {
            warn!(node = %node.our_identity(), from = %session.counterparty(), %reason, "Flow aborted by initiator");
            Err(FlowError::Aborted {
                party: session.counterparty().to_string(),
                reason,
            })
        }
        other => Err(session.unexpected("Finalized", &other).into()),
    }
}

/// Checks a finalised transaction that arrived on `session`, records it and
/// acknowledges it. The notary must actually have committed it; a transaction
/// we were merely told about is refused.
pub async fn record_finalised(
    node: &Node,
    session: &FlowSession,
    stx: SignedTransaction,
    expected: Option<TransactionId>,
) -> Result<SignedTransaction, FlowError> {
    let tx_id = stx.id();
    if let Err(err) = check_finalised(node, session, &stx, expected).await {
        warn!(node = %node.our_identity(), %tx_id, error = %err, "Refusing finalised transaction");
        let _ = session.send(FlowMessage::Reject {
            reason: err.to_string(),
        });
        return Err(err);
    }
    node.vault().record_transaction(&stx).await;
    if let Err(err) = session.send(FlowMessage::Recorded(tx_id)) {
        warn!(%tx_id, error = %err, "Could not acknowledge finalised transaction");
    }
    info!(node = %node.our_identity(), %tx_id, "Recorded finalised transaction");
    Ok(stx)
}

async fn check_finalised(
    node: &Node,
    session: &FlowSession,
    stx: &SignedTransaction,
    expected: Option<TransactionId>,
) -> Result<(), FlowError> {
    let tx_id = stx.id();
    if expected.is_some_and(|id| id != tx_id) {
        return Err(session
            .unexpected(
                "Finalized for the transaction we signed",
                &FlowMessage::Finalized(stx.clone()),
            )
            .into());
    }
    stx.verify_required_signatures()?;
    stx.verify()?;
    if !node.finality().is_committed(&tx_id).await {
        return Err(FlowError::NotNotarised { tx_id });
    }
    Ok(())
}

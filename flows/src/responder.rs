use client::collect_signatures::sign_transaction;
use client::config::ResponderPolicy;
use client::finality::{receive_finality, record_finalised};
use client::{FlowError, Node};
use ledger_api::{FlowKind, FlowMessage, FlowSession, SignedTransaction};
use std::sync::Arc;
use ticket_contract::TicketCommand;
use ticket_type_rep::Party;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How one responder run ended.
#[derive(Debug)]
pub struct ResponderOutcome {
    pub flow: FlowKind,
    pub counterparty: Party,
    pub result: Result<SignedTransaction, FlowError>,
}

/// Accepts inbound sessions until the network drops our inbox, running the
/// responder for each session's flow as its own task.
pub async fn serve(
    node: Arc<Node>,
    mut inbox: mpsc::UnboundedReceiver<FlowSession>,
    outcomes: mpsc::UnboundedSender<ResponderOutcome>,
) {
    while let Some(session) = inbox.recv().await {
        let node = node.clone();
        let outcomes = outcomes.clone();
        tokio::spawn(async move {
            let flow = session.flow();
            let counterparty = session.counterparty().clone();
            let result = respond(&node, session).await;
            match &result {
                Ok(stx) => {
                    info!(node = %node.our_identity(), %flow, from = %counterparty, tx_id = %stx.id(), "Responder finished")
                }
                Err(err) => {
                    warn!(node = %node.our_identity(), %flow, from = %counterparty, kind = err.kind(), error = %err, "Responder failed")
                }
            }
            // Nobody may be listening; the outcome is already logged.
            let _ = outcomes.send(ResponderOutcome {
                flow,
                counterparty,
                result,
            });
        });
    }
}

/// Runs the responder matching the flow that opened `session`.
pub async fn respond(node: &Node, mut session: FlowSession) -> Result<SignedTransaction, FlowError> {
    match session.flow() {
        FlowKind::Buy => receive_finality(node, &mut session, None).await,
        FlowKind::Transfer => {
            let policy = node.policy().clone();
            sign_and_receive(node, session, move |stx| check_transfer(&policy, stx)).await
        }
        FlowKind::Exit => {
            let policy = node.policy().clone();
            sign_and_receive(node, session, move |stx| check_exit(&policy, stx)).await
        }
    }
}

/// Countersigns a proposal and then waits for it to be finalised. A session
/// that skips straight to `Finalized` only wants us to record the result.
async fn sign_and_receive<F>(
    node: &Node,
    mut session: FlowSession,
    check: F,
) -> Result<SignedTransaction, FlowError>
where
    F: FnOnce(&SignedTransaction) -> Result<(), String>,
{
    match session.receive().await? {
        FlowMessage::Propose(stx) => {
            let tx_id = sign_transaction(node, &session, stx, check).await?;
            receive_finality(node, &mut session, Some(tx_id)).await
        }
        FlowMessage::Finalized(stx) => record_finalised(node, &session, stx, None).await,
        FlowMessage::Aborted { reason } => Err(FlowError::Aborted {
            party: session.counterparty().to_string(),
            reason,
        }),
        other => Err(session.unexpected("Propose", &other).into()),
    }
}

fn expect_command(stx: &SignedTransaction, expected: TicketCommand) -> Result<(), String> {
    let actual = stx.tx().command_kind();
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected a {expected} transaction, got {actual}"))
    }
}

/// Only tickets of the configured section are taken on.
pub fn check_transfer(policy: &ResponderPolicy, stx: &SignedTransaction) -> Result<(), String> {
    expect_command(stx, TicketCommand::Transfer)?;
    let output = stx
        .tx()
        .outputs
        .first()
        .ok_or_else(|| "transfer has no output".to_string())?;
    if output.section != policy.transfer_required_section {
        return Err(format!(
            "Only accepted ticket of section = {}",
            policy.transfer_required_section
        ));
    }
    Ok(())
}

pub fn check_exit(policy: &ResponderPolicy, stx: &SignedTransaction) -> Result<(), String> {
    expect_command(stx, TicketCommand::Exit)?;
    if !policy.accept_exit {
        return Err("this party does not agree to retire its tickets".to_string());
    }
    Ok(())
}

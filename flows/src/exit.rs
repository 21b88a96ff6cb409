use client::collect_signatures::collect_signatures;
use client::finality::finalise;
use client::{FlowError, Node, ProgressTracker, Stage};
use ledger_api::{FlowKind, SignedTransaction, TransactionBuilder};
use ticket_contract::{Command, TicketCommand};
use ticket_type_rep::LinearId;
use tracing::info;

use crate::sessions::{counterparties, open_sessions};

/// Retires the current version of `linear_id`. Every participant signs.
pub async fn exit(
    node: &Node,
    linear_id: &LinearId,
    progress: &ProgressTracker,
) -> Result<SignedTransaction, FlowError> {
    progress.set(Stage::Generate);
    let input = node
        .vault()
        .find_unconsumed(linear_id)
        .await
        .ok_or_else(|| FlowError::StateNotFound(linear_id.clone()))?;
    let participants = input.state.participants();
    if !participants.contains(node.our_identity()) {
        return Err(FlowError::NotAParticipant {
            party: node.our_identity().to_string(),
            linear_id: linear_id.clone(),
        });
    }
    let tx = TransactionBuilder::new()
        .add_command(Command::new(
            TicketCommand::Exit,
            input.state.participant_keys(),
        ))
        .add_input_state(input)
        .to_wire_transaction()?;

    progress.set(Stage::Verify);
    tx.verify()?;

    progress.set(Stage::Sign);
    let stx = node.sign_initial_transaction(tx);

    progress.set(Stage::GatherSignatures);
    let others = counterparties(node, &participants, &[]);
    let mut sessions = open_sessions(node, &others, FlowKind::Exit).await?;
    let stx = collect_signatures(node, stx, &mut sessions).await?;

    progress.set(Stage::Finalize);
    let stx = finalise(node, stx, &mut sessions).await?;
    info!(%linear_id, tx_id = %stx.id(), "Ticket retired");
    Ok(stx)
}

use client::collect_signatures::collect_signatures;
use client::finality::{abort_sessions, finalise};
use client::{FlowError, Node, ProgressTracker, Stage};
use ledger_api::{FlowKind, SignedTransaction, TransactionBuilder};
use ticket_contract::{Command, TicketCommand};
use ticket_type_rep::{LinearId, Party};
use tracing::info;

use crate::sessions::{counterparties, open_sessions};

/// Moves the current version of `linear_id` to `new_holder`.
///
/// Both the old and the new holder must sign; whichever of them is not us is
/// asked to countersign. Issuer and both holders learn the outcome.
pub async fn transfer(
    node: &Node,
    linear_id: &LinearId,
    new_holder: &Party,
    progress: &ProgressTracker,
) -> Result<SignedTransaction, FlowError> {
    progress.set(Stage::Generate);
    let input = node
        .vault()
        .find_unconsumed(linear_id)
        .await
        .ok_or_else(|| FlowError::StateNotFound(linear_id.clone()))?;
    let old_holder = input.state.holder.clone();
    let issuer = input.state.issuer.clone();
    let output = input.state.with_holder(new_holder.clone());
    let command = Command::new(
        TicketCommand::Transfer,
        [old_holder.owning_key(), new_holder.owning_key()],
    );
    if !command.signers.contains(&node.our_key()) {
        return Err(FlowError::NotAParticipant {
            party: node.our_identity().to_string(),
            linear_id: linear_id.clone(),
        });
    }
    let tx = TransactionBuilder::new()
        .add_command(command)
        .add_input_state(input)
        .add_output_state(output)
        .to_wire_transaction()?;

    progress.set(Stage::Verify);
    tx.verify()?;

    progress.set(Stage::Sign);
    let stx = node.sign_initial_transaction(tx);

    progress.set(Stage::GatherSignatures);
    let signers = counterparties(node, [&old_holder, new_holder], &[]);
    let mut sessions = open_sessions(node, &signers, FlowKind::Transfer).await?;
    let stx = collect_signatures(node, stx, &mut sessions).await?;

    progress.set(Stage::Finalize);
    let signer_keys: Vec<_> = signers.iter().map(Party::owning_key).collect();
    let observers = counterparties(node, [&issuer], &signer_keys);
    match open_sessions(node, &observers, FlowKind::Transfer).await {
        Ok(observer_sessions) => sessions.extend(observer_sessions),
        Err(err) => {
            abort_sessions(&sessions, &err.to_string());
            return Err(err);
        }
    }
    let stx = finalise(node, stx, &mut sessions).await?;
    info!(%linear_id, tx_id = %stx.id(), from = %old_holder, to = %new_holder, "Ticket transferred");
    Ok(stx)
}

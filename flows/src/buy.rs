use client::finality::finalise;
use client::{FlowError, Node, ProgressTracker, Stage};
use ledger_api::{FlowKind, SignedTransaction, TransactionBuilder};
use ticket_contract::{Command, TicketCommand};
use ticket_type_rep::{Party, TicketState};
use tracing::info;

/// Issues a new ticket in `section` to `holder`, with this node as issuer.
///
/// The holder does not sign; it is only sent the finalised transaction.
pub async fn buy(
    node: &Node,
    holder: &Party,
    section: i32,
    progress: &ProgressTracker,
) -> Result<SignedTransaction, FlowError> {
    progress.set(Stage::Generate);
    let issuer = node.our_identity().clone();
    let output = TicketState::new(issuer, holder.clone(), section);
    let linear_id = output.linear_id.clone();
    let tx = TransactionBuilder::new()
        .add_command(Command::new(TicketCommand::Buy, [node.our_key()]))
        .add_output_state(output)
        .to_wire_transaction()?;

    progress.set(Stage::Verify);
    tx.verify()?;

    progress.set(Stage::Sign);
    let stx = node.sign_initial_transaction(tx);

    progress.set(Stage::Finalize);
    let holder_session = node.initiate_flow(holder, FlowKind::Buy).await?;
    let stx = finalise(node, stx, &mut [holder_session]).await?;
    info!(%linear_id, tx_id = %stx.id(), holder = %holder, section, "Ticket issued");
    Ok(stx)
}

use client::{FlowError, Node};
use ledger_api::{FlowKind, FlowSession};
use ticket_type_rep::{Party, PublicKey};

/// `parties` minus ourselves and minus anyone listed twice, in first-seen order.
pub fn counterparties<'a>(
    node: &Node,
    parties: impl IntoIterator<Item = &'a Party>,
    skip: &[PublicKey],
) -> Vec<Party> {
    let mut seen: Vec<PublicKey> = vec![node.our_key()];
    seen.extend_from_slice(skip);
    let mut result = Vec::new();
    for party in parties {
        if seen.contains(&party.owning_key()) {
            continue;
        }
        seen.push(party.owning_key());
        result.push(party.clone());
    }
    result
}

pub async fn open_sessions(
    node: &Node,
    parties: &[Party],
    flow: FlowKind,
) -> Result<Vec<FlowSession>, FlowError> {
    let mut sessions = Vec::with_capacity(parties.len());
    for party in parties {
        sessions.push(node.initiate_flow(party, flow).await?);
    }
    Ok(sessions)
}

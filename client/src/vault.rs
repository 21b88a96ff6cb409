use async_trait::async_trait;
use ledger_api::{SignedTransaction, StateAndRef, StateStatus, TransactionId, VaultService};
use ticket_type_rep::LinearId;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct VaultEntry {
    state_and_ref: StateAndRef,
    consumed_by: Option<TransactionId>,
}

impl VaultEntry {
    fn matches(&self, status: StateStatus) -> bool {
        match status {
            StateStatus::Unconsumed => self.consumed_by.is_none(),
            StateStatus::Consumed => self.consumed_by.is_some(),
            StateStatus::All => true,
        }
    }
}

/// Node-local cache of every ticket version the node has seen, in the order
/// it first saw them. The notary's record is authoritative; this is for queries.
#[derive(Default)]
pub struct InMemoryVault {
    entries: RwLock<Vec<VaultEntry>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultService for InMemoryVault {
    async fn find_unconsumed(&self, linear_id: &LinearId) -> Option<StateAndRef> {
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .find(|entry| {
                entry.consumed_by.is_none() && entry.state_and_ref.state.linear_id == *linear_id
            })
            .map(|entry| entry.state_and_ref.clone())
    }

    async fn query(&self, status: StateStatus) -> Vec<StateAndRef> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.matches(status))
            .map(|entry| entry.state_and_ref.clone())
            .collect()
    }

    async fn record_transaction(&self, stx: &SignedTransaction) {
        let id = stx.id();
        let mut entries = self.entries.write().await;
        for input in &stx.tx().inputs {
            match entries
                .iter_mut()
                .find(|entry| entry.state_and_ref.reference == input.reference)
            {
                Some(entry) => {
                    entry.consumed_by.get_or_insert(id);
                }
                None => entries.push(VaultEntry {
                    state_and_ref: input.clone(),
                    consumed_by: Some(id),
                }),
            }
        }
        for (index, output) in stx.tx().outputs.iter().enumerate() {
            let reference = stx.tx().output_ref(index as u32);
            if entries
                .iter()
                .any(|entry| entry.state_and_ref.reference == reference)
            {
                continue;
            }
            entries.push(VaultEntry {
                state_and_ref: StateAndRef {
                    state: output.clone(),
                    reference,
                },
                consumed_by: None,
            });
        }
        debug!(tx_id = %id, "Recorded transaction in vault");
    }
}

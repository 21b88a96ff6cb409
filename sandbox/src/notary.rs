use async_trait::async_trait;
use ledger_api::{
    FinalityError, FinalityService, SignedTransaction, StateAndRef, StateRef, TransactionId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Default)]
struct LedgerState {
    transactions: HashMap<TransactionId, SignedTransaction>,
    consumed: HashMap<StateRef, TransactionId>,
}

impl LedgerState {
    fn output_at(&self, state_ref: &StateRef) -> Option<&ticket_type_rep::TicketState> {
        self.transactions
            .get(&state_ref.tx_id)
            .and_then(|stx| stx.tx().outputs.get(state_ref.index as usize))
    }
}

/// Validating notary holding the authoritative transaction store.
///
/// Commits are serialised by one lock, so of two transactions racing for the
/// same input exactly one wins and the other gets a conflict.
pub struct Notary {
    ledger: Mutex<LedgerState>,
    available: AtomicBool,
}

impl Default for Notary {
    fn default() -> Self {
        Self::new()
    }
}

impl Notary {
    pub fn new() -> Self {
        Notary {
            ledger: Mutex::new(LedgerState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// While unavailable every submission fails with a system error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn transaction(&self, id: &TransactionId) -> Option<SignedTransaction> {
        self.ledger.lock().await.transactions.get(id).cloned()
    }

    pub async fn consumed_by(&self, state_ref: &StateRef) -> Option<TransactionId> {
        self.ledger.lock().await.consumed.get(state_ref).copied()
    }

    pub async fn is_unconsumed(&self, state_ref: &StateRef) -> bool {
        let ledger = self.ledger.lock().await;
        ledger.output_at(state_ref).is_some() && !ledger.consumed.contains_key(state_ref)
    }

    pub async fn unconsumed_states(&self) -> Vec<StateAndRef> {
        let ledger = self.ledger.lock().await;
        let mut states = Vec::new();
        for (tx_id, stx) in &ledger.transactions {
            for (index, state) in stx.tx().outputs.iter().enumerate() {
                let reference = StateRef {
                    tx_id: *tx_id,
                    index: index as u32,
                };
                if !ledger.consumed.contains_key(&reference) {
                    states.push(StateAndRef {
                        state: state.clone(),
                        reference,
                    });
                }
            }
        }
        states
    }
}

#[async_trait]
impl FinalityService for Notary {
    async fn notarise_and_record(
        &self,
        stx: &SignedTransaction,
    ) -> Result<TransactionId, FinalityError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(FinalityError::Unavailable(
                "notary is not accepting transactions".to_string(),
            ));
        }
        let id = stx.id();
        stx.verify_required_signatures()
            .map_err(|e| FinalityError::Rejected {
                reason: e.to_string(),
            })?;
        stx.verify().map_err(|e| FinalityError::Rejected {
            reason: e.to_string(),
        })?;

        let mut ledger = self.ledger.lock().await;
        if ledger.transactions.contains_key(&id) {
            info!(tx_id = %id, "Transaction already notarised");
            return Ok(id);
        }
        for input in &stx.tx().inputs {
            if let Some(consumed_by) = ledger.consumed.get(&input.reference) {
                warn!(tx_id = %id, state_ref = %input.reference, consumed_by = %consumed_by, "Double spend rejected");
                return Err(FinalityError::Conflict {
                    state_ref: input.reference,
                    consumed_by: *consumed_by,
                });
            }
            match ledger.output_at(&input.reference) {
                Some(recorded) if *recorded == input.state => {}
                Some(_) => {
                    return Err(FinalityError::Rejected {
                        reason: format!("input {} does not match the recorded state", input.reference),
                    });
                }
                None => {
                    return Err(FinalityError::Rejected {
                        reason: format!("input {} is unknown to the notary", input.reference),
                    });
                }
            }
        }
        for input in &stx.tx().inputs {
            ledger.consumed.insert(input.reference, id);
        }
        ledger.transactions.insert(id, stx.clone());
        info!(
            tx_id = %id,
            command = %stx.tx().command_kind(),
            inputs = stx.tx().inputs.len(),
            outputs = stx.tx().outputs.len(),
            "Transaction notarised"
        );
        Ok(id)
    }

    async fn is_committed(&self, id: &TransactionId) -> bool {
        self.ledger.lock().await.transactions.contains_key(id)
    }
}

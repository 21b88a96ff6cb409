use client::parties::resolve_party;
use client::{FlowError, Node, ProgressTracker};
use ledger_api::{SignedTransaction, StateStatus, TransactionId};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::sync::Arc;
use ticket_type_rep::{LinearId, Party, TicketState};
use tracing::{info, warn};

use crate::{buy, exit, transfer};

/// What a successful flow produced: the notarised transaction's id and the
/// ticket versions it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowOutcome {
    #[serde(serialize_with = "as_display")]
    pub tx_id: TransactionId,
    pub states: Vec<TicketState>,
}

impl From<&SignedTransaction> for FlowOutcome {
    fn from(stx: &SignedTransaction) -> Self {
        FlowOutcome {
            tx_id: stx.id(),
            states: stx.tx().outputs.clone(),
        }
    }
}

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// The operations a front end drives a node with. Party names are resolved
/// here; flows only ever see resolved parties.
pub struct TicketApi {
    node: Arc<Node>,
}

impl TicketApi {
    pub fn new(node: Arc<Node>) -> Self {
        TicketApi { node }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub async fn issue(&self, holder_name: &str, section: i32) -> Result<FlowOutcome, FlowError> {
        if holder_name.trim().is_empty() {
            return Err(FlowError::Input("holder name must not be empty".to_string()));
        }
        if section <= 0 {
            return Err(FlowError::Input("section must be positive".to_string()));
        }
        let holder = resolve_party(self.node.identities(), holder_name).await?;
        let progress = ProgressTracker::new();
        let result = buy::buy(&self.node, &holder, section, &progress).await;
        self.outcome("issue", result)
    }

    pub async fn transfer(
        &self,
        linear_id: &LinearId,
        new_holder_name: &str,
    ) -> Result<FlowOutcome, FlowError> {
        let new_holder = resolve_party(self.node.identities(), new_holder_name).await?;
        let progress = ProgressTracker::new();
        let result = transfer::transfer(&self.node, linear_id, &new_holder, &progress).await;
        self.outcome("transfer", result)
    }

    pub async fn exit(&self, linear_id: &LinearId) -> Result<FlowOutcome, FlowError> {
        let progress = ProgressTracker::new();
        let result = exit::exit(&self.node, linear_id, &progress).await;
        self.outcome("exit", result)
    }

    /// Every ticket version this node knows of, consumed or not, that
    /// `issuer` issued.
    pub async fn list_issued_by(&self, issuer: &Party) -> Vec<TicketState> {
        self.node
            .vault()
            .query(StateStatus::All)
            .await
            .into_iter()
            .map(|found| found.state)
            .filter(|state| state.issuer == *issuer)
            .collect()
    }

    /// Unconsumed tickets this node issued.
    pub async fn my_tickets(&self) -> Vec<TicketState> {
        let us = self.node.our_identity();
        self.node
            .vault()
            .query(StateStatus::Unconsumed)
            .await
            .into_iter()
            .map(|found| found.state)
            .filter(|state| state.issuer == *us)
            .collect()
    }

    fn outcome(
        &self,
        operation: &str,
        result: Result<SignedTransaction, FlowError>,
    ) -> Result<FlowOutcome, FlowError> {
        match result {
            Ok(stx) => {
                info!(node = %self.node.our_identity(), operation, tx_id = %stx.id(), "Flow succeeded");
                Ok(FlowOutcome::from(&stx))
            }
            Err(err) => {
                warn!(node = %self.node.our_identity(), operation, kind = err.kind(), error = %err, "Flow failed");
                Err(err)
            }
        }
    }
}

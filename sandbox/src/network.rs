use async_trait::async_trait;
use ledger_api::{FlowKind, FlowSession, IdentityService, SessionError, SessionMessaging};
use std::collections::BTreeMap;
use ticket_type_rep::Party;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("a party named '{0}' is already registered")]
    DuplicateParty(String),
}

struct Registration {
    party: Party,
    inbox: mpsc::UnboundedSender<FlowSession>,
}

/// Network map and session bus in one.
///
/// Each registered party gets an inbox of inbound sessions; opening a session
/// to a party drops the responder end of a fresh [`FlowSession`] pair into it.
#[derive(Default)]
pub struct Network {
    parties: RwLock<BTreeMap<String, Registration>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        party: Party,
    ) -> Result<mpsc::UnboundedReceiver<FlowSession>, NetworkError> {
        let mut parties = self.parties.write().await;
        if parties.contains_key(party.name()) {
            return Err(NetworkError::DuplicateParty(party.name().to_string()));
        }
        let (inbox, inbound) = mpsc::unbounded_channel();
        info!(party = %party, key = %party.owning_key(), "Registered party");
        parties.insert(party.name().to_string(), Registration { party, inbox });
        Ok(inbound)
    }
}

#[async_trait]
impl SessionMessaging for Network {
    async fn initiate_flow(
        &self,
        initiator: &Party,
        counterparty: &Party,
        flow: FlowKind,
    ) -> Result<FlowSession, SessionError> {
        let parties = self.parties.read().await;
        let registration = parties
            .get(counterparty.name())
            .filter(|r| r.party == *counterparty)
            .ok_or_else(|| SessionError::UnknownParty(counterparty.to_string()))?;
        let (initiator_end, responder_end) =
            FlowSession::pair(initiator.clone(), counterparty.clone(), flow);
        registration
            .inbox
            .send(responder_end)
            .map_err(|_| SessionError::Closed {
                counterparty: counterparty.to_string(),
            })?;
        debug!(%flow, from = %initiator, to = %counterparty, "Session opened");
        Ok(initiator_end)
    }
}

#[async_trait]
impl IdentityService for Network {
    async fn well_known_party_from_name(&self, name: &str) -> Option<Party> {
        self.parties
            .read()
            .await
            .get(name)
            .map(|registration| registration.party.clone())
    }

    async fn all_parties(&self) -> Vec<Party> {
        self.parties
            .read()
            .await
            .values()
            .map(|registration| registration.party.clone())
            .collect()
    }
}

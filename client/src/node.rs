use ed25519_dalek::SigningKey;
use ledger_api::{
    FinalityService, FlowKind, FlowSession, IdentityService, SessionError, SessionMessaging,
    SignedTransaction, TransactionSignature, VaultService, WireTransaction,
};
use rand::rngs::OsRng;
use std::sync::Arc;
use ticket_type_rep::{Party, PublicKey};

use crate::config::ResponderPolicy;

/// The collaborators a node is wired to. Everything a flow touches outside
/// the node itself goes through one of these.
#[derive(Clone)]
pub struct NodeServices {
    pub vault: Arc<dyn VaultService>,
    pub finality: Arc<dyn FinalityService>,
    pub messaging: Arc<dyn SessionMessaging>,
    pub identities: Arc<dyn IdentityService>,
}

/// A party's node: its identity, the key it signs with, and its services.
pub struct Node {
    identity: Party,
    signing_key: SigningKey,
    services: NodeServices,
    policy: ResponderPolicy,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        signing_key: SigningKey,
        services: NodeServices,
        policy: ResponderPolicy,
    ) -> Self {
        let identity = Party::new(name, PublicKey::from(&signing_key.verifying_key()));
        Node {
            identity,
            signing_key,
            services,
            policy,
        }
    }

    /// A node with a freshly generated key.
    pub fn generate(name: impl Into<String>, services: NodeServices, policy: ResponderPolicy) -> Self {
        Self::new(name, SigningKey::generate(&mut OsRng), services, policy)
    }

    pub fn our_identity(&self) -> &Party {
        &self.identity
    }

    pub fn our_key(&self) -> PublicKey {
        self.identity.owning_key()
    }

    pub fn policy(&self) -> &ResponderPolicy {
        &self.policy
    }

    pub fn vault(&self) -> &dyn VaultService {
        self.services.vault.as_ref()
    }

    pub fn finality(&self) -> &dyn FinalityService {
        self.services.finality.as_ref()
    }

    pub fn identities(&self) -> &dyn IdentityService {
        self.services.identities.as_ref()
    }

    pub fn sign_initial_transaction(&self, tx: WireTransaction) -> SignedTransaction {
        let signature = TransactionSignature::sign(&tx.id(), &self.signing_key);
        SignedTransaction::new(tx, vec![signature])
    }

    pub fn create_signature(&self, stx: &SignedTransaction) -> TransactionSignature {
        TransactionSignature::sign(&stx.id(), &self.signing_key)
    }

    pub async fn initiate_flow(
        &self,
        counterparty: &Party,
        flow: FlowKind,
    ) -> Result<FlowSession, SessionError> {
        self.services
            .messaging
            .initiate_flow(&self.identity, counterparty, flow)
            .await
    }
}

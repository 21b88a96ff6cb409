use anyhow::{Context, Result};
use client::config::ResponderPolicy;
use client::vault::InMemoryVault;
use client::{Node, NodeServices};
use sandbox::{Network, Notary};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::TicketApi;
use crate::responder::{ResponderOutcome, serve};

/// A notary and a network, ready to have nodes started on them.
#[derive(Clone, Default)]
pub struct SandboxNetwork {
    pub notary: Arc<Notary>,
    pub network: Arc<Network>,
}

impl SandboxNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, name: &str) -> Result<RunningNode> {
        self.start_with_policy(name, ResponderPolicy::default()).await
    }

    pub async fn start_with_policy(&self, name: &str, policy: ResponderPolicy) -> Result<RunningNode> {
        start_node(self.network.clone(), self.notary.clone(), name, policy).await
    }
}

/// A node registered on the network with its responder loop running.
/// Dropping it stops the loop.
pub struct RunningNode {
    api: TicketApi,
    outcomes: Mutex<mpsc::UnboundedReceiver<ResponderOutcome>>,
    server: JoinHandle<()>,
}

impl RunningNode {
    pub fn api(&self) -> &TicketApi {
        &self.api
    }

    pub fn node(&self) -> &Node {
        self.api.node()
    }

    /// Waits for the next responder run on this node to finish.
    pub async fn next_responder_outcome(&self) -> Option<ResponderOutcome> {
        self.outcomes.lock().await.recv().await
    }

    /// Stops keeping responder outcomes for callers that never read them.
    /// They are still logged by the responder loop.
    pub async fn discard_responder_outcomes(&self) {
        let mut outcomes = self.outcomes.lock().await;
        outcomes.close();
        while outcomes.try_recv().is_ok() {}
    }
}

impl Drop for RunningNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Creates a node called `name` with a fresh key and an empty vault,
/// registers it and starts serving its inbound sessions.
pub async fn start_node(
    network: Arc<Network>,
    notary: Arc<Notary>,
    name: &str,
    policy: ResponderPolicy,
) -> Result<RunningNode> {
    let services = NodeServices {
        vault: Arc::new(InMemoryVault::new()),
        finality: notary,
        messaging: network.clone(),
        identities: network.clone(),
    };
    let node = Arc::new(Node::generate(name, services, policy));
    let inbox = network
        .register(node.our_identity().clone())
        .await
        .with_context(|| format!("Failed to register node {name}"))?;
    let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve(node.clone(), inbox, outcomes_tx));
    info!(node = %node.our_identity(), policy = ?node.policy(), "Node started");
    Ok(RunningNode {
        api: TicketApi::new(node),
        outcomes: Mutex::new(outcomes_rx),
        server,
    })
}

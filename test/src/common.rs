use anyhow::{Context, Result};
use client::config::ResponderPolicy;
use flows::bootstrap::{RunningNode, SandboxNetwork};
use ticket_type_rep::LinearId;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_test_writer()
        .try_init()
        .ok();
}

pub struct Parties {
    pub net: SandboxNetwork,
    pub alice: RunningNode,
    pub bob: RunningNode,
    pub carol: RunningNode,
}

/// Alice, Bob and Carol on a fresh sandbox; Bob answers with `bob_policy`.
pub async fn three_parties(bob_policy: ResponderPolicy) -> Result<Parties> {
    init_tracing();
    let net = SandboxNetwork::new();
    let alice = net.start("Alice").await?;
    let bob = net.start_with_policy("Bob", bob_policy).await?;
    let carol = net.start("Carol").await?;
    Ok(Parties {
        net,
        alice,
        bob,
        carol,
    })
}

/// Alice issues a ticket to Bob and Bob records it.
pub async fn alice_issues_to_bob(parties: &Parties, section: i32) -> Result<LinearId> {
    let outcome = parties.alice.api().issue("Bob", section).await?;
    let recorded = parties
        .bob
        .next_responder_outcome()
        .await
        .context("Bob stopped responding")?;
    recorded.result?;
    Ok(outcome.states[0].linear_id.clone())
}

use anyhow::Result;
use client::config::ResponderPolicy;
use client::{FlowError, ProgressTracker, Stage};
use ticket_contract::Rule;

use crate::common::{alice_issues_to_bob, three_parties};

#[tokio::test]
async fn test_section_15_transfer_rejected_by_counterparty() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 15).await?;

    let progress = ProgressTracker::new();
    let err = flows::transfer::transfer(
        parties.bob.node(),
        &linear_id,
        parties.alice.node().our_identity(),
        &progress,
    )
    .await
    .unwrap_err();
    match &err {
        FlowError::CounterpartyRejected { party, reason } => {
            assert_eq!(party, "Alice");
            assert!(reason.contains("Only accepted ticket of section = 30"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    // Structurally fine: it got past verification to the counterparty.
    assert_eq!(progress.current(), Some(Stage::GatherSignatures));
    let still_there = parties.bob.node().vault().find_unconsumed(&linear_id).await;
    let still_there = still_there.expect("ticket unconsumed");
    assert!(parties.net.notary.is_unconsumed(&still_there.reference).await);
    Ok(())
}

#[tokio::test]
async fn test_section_30_transfer_back_to_issuer() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let outcome = parties.bob.api().transfer(&linear_id, "Alice").await?;
    let ticket = &outcome.states[0];
    assert_eq!(ticket.holder, *parties.alice.node().our_identity());
    assert_eq!(ticket.linear_id, linear_id);

    parties.alice.next_responder_outcome().await;
    let current = parties
        .alice
        .node()
        .vault()
        .find_unconsumed(&linear_id)
        .await
        .expect("Alice holds the new version");
    assert_eq!(current.state, *ticket);
    Ok(())
}

// Handing a ticket to a third party keeps the issuer, which the contract's
// literal issuer/holder rule does not allow.
#[tokio::test]
async fn test_transfer_to_carol_fails_literal_issuer_rule() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let err = parties.bob.api().transfer(&linear_id, "Carol").await.unwrap_err();
    match &err {
        FlowError::Verification(err) => assert_eq!(err.rule, Rule::IssuerNotNewHolder),
        other => panic!("unexpected error: {other}"),
    }
    assert!(parties.bob.node().vault().find_unconsumed(&linear_id).await.is_some());
    Ok(())
}

#[tokio::test]
async fn test_carol_cannot_move_bobs_ticket() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let err = parties.carol.api().transfer(&linear_id, "Alice").await.unwrap_err();
    assert!(matches!(err, FlowError::StateNotFound(_)));
    Ok(())
}

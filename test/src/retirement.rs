use anyhow::Result;
use client::config::ResponderPolicy;
use client::{FlowError, ProgressTracker, Stage};
use ledger_api::StateStatus;

use crate::common::{alice_issues_to_bob, three_parties};

#[tokio::test]
async fn test_exit_needs_both_signatures() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let outcome = parties.alice.api().exit(&linear_id).await?;
    assert!(outcome.states.is_empty());
    let stx = parties
        .net
        .notary
        .transaction(&outcome.tx_id)
        .await
        .expect("notarised");
    let signed_by = stx.signed_by();
    assert!(signed_by.contains(&parties.alice.node().our_key()));
    assert!(signed_by.contains(&parties.bob.node().our_key()));

    parties.bob.next_responder_outcome().await;
    for running in [&parties.alice, &parties.bob] {
        assert!(running.node().vault().find_unconsumed(&linear_id).await.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_exit_refused_by_bob_leaves_ticket_unconsumed() -> Result<()> {
    let refusing = ResponderPolicy {
        accept_exit: false,
        ..ResponderPolicy::default()
    };
    let parties = three_parties(refusing).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let progress = ProgressTracker::new();
    let err = flows::exit::exit(parties.alice.node(), &linear_id, &progress)
        .await
        .unwrap_err();
    match &err {
        FlowError::CounterpartyRejected { party, .. } => assert_eq!(party, "Bob"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.kind(), "counterparty-rejection");
    assert_eq!(progress.current(), Some(Stage::GatherSignatures));

    let responded = parties.bob.next_responder_outcome().await.expect("Bob responded");
    assert!(responded.result.is_err());

    for running in [&parties.alice, &parties.bob] {
        let found = running.node().vault().find_unconsumed(&linear_id).await;
        let found = found.expect("ticket still live");
        assert!(parties.net.notary.is_unconsumed(&found.reference).await);
    }
    assert_eq!(
        parties.alice.node().vault().query(StateStatus::Consumed).await.len(),
        0
    );
    Ok(())
}

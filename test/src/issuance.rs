use anyhow::Result;
use client::config::ResponderPolicy;
use client::{FlowError, ProgressTracker, Stage};
use ledger_api::StateStatus;
use ticket_contract::Rule;

use crate::common::{alice_issues_to_bob, three_parties};

#[tokio::test]
async fn test_issue_to_bob_creates_fresh_ticket() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let alice = parties.alice.node().our_identity();
    let bob = parties.bob.node().our_identity();
    for running in [&parties.alice, &parties.bob] {
        let found = running
            .node()
            .vault()
            .find_unconsumed(&linear_id)
            .await
            .expect("both sides record the new ticket");
        assert_eq!(&found.state.issuer, alice);
        assert_eq!(&found.state.holder, bob);
        assert_eq!(found.state.section, 30);
        assert!(parties.net.notary.is_unconsumed(&found.reference).await);
    }
    // Carol was not involved and knows nothing.
    assert!(parties.carol.node().vault().query(StateStatus::All).await.is_empty());

    let second = alice_issues_to_bob(&parties, 30).await?;
    assert_ne!(second, linear_id);
    Ok(())
}

#[tokio::test]
async fn test_issue_with_section_20_is_rejected() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;

    // Alice names herself as holder: the section is wrong as well.
    let err = parties.alice.api().issue("Alice", 20).await.unwrap_err();
    match &err {
        FlowError::Verification(err) => {
            assert!(err.violates(&Rule::SectionNotAllowed { section: 20 }))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Only LOW=15, MID=30 or HIGH=50 section allowed, found 20"));

    let err = parties.alice.api().issue("Bob", 20).await.unwrap_err();
    match &err {
        FlowError::Verification(err) => {
            assert_eq!(err.rule, Rule::SectionNotAllowed { section: 20 })
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(parties.net.notary.unconsumed_states().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_issue_to_unknown_holder_is_an_input_error() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let err = parties.alice.api().issue("Dave", 30).await.unwrap_err();
    assert!(matches!(err, FlowError::Input(_)));
    Ok(())
}

#[tokio::test]
async fn test_issue_fails_cleanly_while_notary_is_down() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    parties.net.notary.set_available(false);

    let progress = ProgressTracker::new();
    let err = flows::buy::buy(
        parties.alice.node(),
        parties.bob.node().our_identity(),
        30,
        &progress,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "system");
    assert_eq!(progress.current(), Some(Stage::Finalize));

    let responded = parties.bob.next_responder_outcome().await.expect("Bob responded");
    assert!(matches!(responded.result, Err(FlowError::Aborted { .. })));
    for running in [&parties.alice, &parties.bob] {
        assert!(running.node().vault().query(StateStatus::All).await.is_empty());
    }

    parties.net.notary.set_available(true);
    alice_issues_to_bob(&parties, 30).await?;
    Ok(())
}

use anyhow::Result;
use client::FlowError;
use client::config::ResponderPolicy;
use futures_util::future::join_all;

use crate::common::{alice_issues_to_bob, three_parties};

#[tokio::test]
async fn test_concurrent_exits_one_wins() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let (from_alice, from_bob) = tokio::join!(
        parties.alice.api().exit(&linear_id),
        parties.bob.api().exit(&linear_id),
    );
    let results = [from_alice, from_bob];
    let won = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(won, 1, "{results:?}");

    let lost = results
        .into_iter()
        .find_map(|result| result.err())
        .expect("one exit lost");
    // Both countersign, so the loser is only stopped by the notary.
    assert!(lost.is_conflict(), "{lost}");
    assert_eq!(lost.kind(), "finality-conflict");
    Ok(())
}

#[tokio::test]
async fn test_flows_on_different_tickets_run_side_by_side() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(alice_issues_to_bob(&parties, 50).await?);
    }

    let results = join_all(ids.iter().map(|id| parties.bob.api().exit(id))).await;
    for result in results {
        result?;
    }
    for id in &ids {
        assert!(parties.bob.node().vault().find_unconsumed(id).await.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_loser_retry_after_conflict_finds_nothing_left() -> Result<()> {
    let parties = three_parties(ResponderPolicy::default()).await?;
    let linear_id = alice_issues_to_bob(&parties, 30).await?;

    let (from_alice, from_bob) = tokio::join!(
        parties.alice.api().exit(&linear_id),
        parties.bob.api().exit(&linear_id),
    );
    // The winner only returns once the loser has recorded its exit.
    let loser = match (from_alice, from_bob) {
        (Ok(_), Err(err)) => {
            assert!(err.is_conflict(), "{err}");
            &parties.bob
        }
        (Err(err), Ok(_)) => {
            assert!(err.is_conflict(), "{err}");
            &parties.alice
        }
        other => panic!("expected exactly one winner: {other:?}"),
    };

    let err = loser.api().exit(&linear_id).await.unwrap_err();
    assert!(matches!(err, FlowError::StateNotFound(_)), "{err}");
    assert_eq!(err.kind(), "input");
    Ok(())
}

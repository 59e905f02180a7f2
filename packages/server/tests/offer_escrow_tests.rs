//! Offer and escrow tests against a real Postgres.
//!
//! Acceptance must be all-or-nothing: the buyer's debit, the status flip, the
//! order row and the confirmation message either all land or none do, and a
//! losing concurrent accept gets its debit back.

mod common;

use common::*;
use test_context::test_context;

use api_core::common::CoreError;
use api_core::domains::conversations::models::{Conversation, Message};
use api_core::domains::offers::actions::{accept_offer, create_offer};
use api_core::domains::offers::models::{Milestone, Offer, Order};

#[test_context(TestHarness)]
#[tokio::test]
async fn accepting_an_offer_debits_buyer_and_creates_order(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 2_000).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let offer = create_offer(
        &deps,
        conversation.id,
        freelancer,
        client,
        600,
        7,
        "logo design".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap();

    let (accepted, order) = accept_offer(&deps, offer.id, client, None).await.unwrap();

    assert_eq!(accepted.status, "accepted");
    assert_eq!(order.amount, 600);
    assert_eq!(order.platform_fee, 120);
    assert_eq!(balance_of(&ctx.db_pool, client).await.unwrap(), 1_400);

    // Order row and confirmation message both landed.
    let stored = Order::find_by_offer(offer.id, &ctx.db_pool).await.unwrap();
    assert!(stored.is_some());
    let messages = Message::find_by_conversation(conversation.id, None, &ctx.db_pool)
        .await
        .unwrap();
    assert!(messages
        .iter()
        .any(|m| m.content.starts_with("Offer accepted")));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_accepts_produce_one_order_and_refund_the_loser(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 1_200).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let offer = create_offer(
        &deps,
        conversation.id,
        freelancer,
        client,
        600,
        5,
        "rush job".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap();

    let (first, second) = tokio::join!(
        accept_offer(&deps, offer.id, client, None),
        accept_offer(&deps, offer.id, client, None),
    );

    // Exactly one winner; the loser's state error never leaves a dangling debit.
    assert!(first.is_ok() != second.is_ok());
    let loser = if first.is_err() { first } else { second };
    assert!(matches!(loser.unwrap_err(), CoreError::InvalidState(_)));

    assert_eq!(balance_of(&ctx.db_pool, client).await.unwrap(), 600);

    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE offer_id = $1")
        .bind(offer.id)
        .fetch_one(&ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(orders, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn insufficient_funds_leave_the_offer_pending(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 100).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let offer = create_offer(
        &deps,
        conversation.id,
        freelancer,
        client,
        600,
        7,
        "logo design".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap();

    let err = accept_offer(&deps, offer.id, client, None).await.unwrap_err();
    assert!(matches!(err, CoreError::InsufficientFunds));

    assert_eq!(balance_of(&ctx.db_pool, client).await.unwrap(), 100);
    let stored = Offer::find_by_id(offer.id, &ctx.db_pool).await.unwrap().unwrap();
    assert!(stored.is_pending());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn offer_to_self_is_rejected(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 2_000).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let err = create_offer(
        &deps,
        conversation.id,
        client,
        client,
        600,
        7,
        "self deal".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::NotAuthorized(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn offer_receiver_must_be_the_counterpart(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 2_000).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let outsider = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let err = create_offer(
        &deps,
        conversation.id,
        freelancer,
        outsider,
        600,
        7,
        "wrong party".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::NotAuthorized(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn milestone_sum_overflow_is_rejected(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 2_000).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let milestone = |price: i64| Milestone {
        name: "phase".to_string(),
        price,
        due_date: None,
    };

    // A wrapping sum must not be allowed to satisfy the equality check.
    let err = create_offer(
        &deps,
        conversation.id,
        freelancer,
        client,
        600,
        7,
        "overflowing milestones".to_string(),
        vec![milestone(i64::MAX), milestone(1)],
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn price_above_ceiling_is_rejected(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 2_000).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();
    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();

    let err = create_offer(
        &deps,
        conversation.id,
        freelancer,
        client,
        deps.economics.max_offer_price + 1,
        7,
        "absurd price".to_string(),
        vec![],
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState(_)));
}

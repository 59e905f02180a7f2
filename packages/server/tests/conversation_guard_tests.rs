//! Conversation guard tests against a real Postgres.
//!
//! Covers the freeze gate on participant messages, the moderation pipeline's
//! freeze directive end to end, and pair uniqueness under concurrent first
//! contact.

mod common;

use common::*;
use test_context::test_context;

use api_core::common::CoreError;
use api_core::domains::conversations::actions::post_message;
use api_core::domains::conversations::models::Conversation;
use api_core::domains::moderation::CONTACT_REDACTION_PLACEHOLDER;

#[test_context(TestHarness)]
#[tokio::test]
async fn frozen_conversation_rejects_participant_messages(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 0).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();

    post_message(&deps, client, freelancer, "hello there", None)
        .await
        .unwrap();

    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();
    Conversation::set_frozen(conversation.id, true, &ctx.db_pool)
        .await
        .unwrap();

    // Both directions are blocked while frozen.
    let err = post_message(&deps, client, freelancer, "still there?", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
    let err = post_message(&deps, freelancer, client, "yes", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn phone_number_redacts_and_freezes_end_to_end(ctx: &TestHarness) {
    let deps = ctx.deps();
    let client = create_test_client(&ctx.db_pool, 0).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();

    let message = post_message(&deps, client, freelancer, "call me at 010-1234-5678", None)
        .await
        .unwrap();

    assert_eq!(message.content, CONTACT_REDACTION_PLACEHOLDER);
    assert!(!message.content.contains("1234"));

    let conversation = Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool)
        .await
        .unwrap();
    assert!(conversation.is_frozen);

    let err = post_message(&deps, freelancer, client, "ok", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_first_contact_converges_on_one_conversation(ctx: &TestHarness) {
    let client = create_test_client(&ctx.db_pool, 0).await.unwrap();
    let freelancer = create_test_freelancer(&ctx.db_pool).await.unwrap();

    // Opposite participant order; the canonical pair key must collapse both.
    let (first, second) = tokio::join!(
        Conversation::find_or_create_for_pair(client, freelancer, &ctx.db_pool),
        Conversation::find_or_create_for_pair(freelancer, client, &ctx.db_pool),
    );

    assert_eq!(first.unwrap().id, second.unwrap().id);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM conversations WHERE pair_low IN ($1, $2) AND pair_high IN ($1, $2)",
    )
    .bind(client)
    .bind(freelancer)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

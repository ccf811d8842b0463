// tests/engagement_lifecycle_tests.rs
mod common;

use common::*;
use marketplace_core::engagements;
use marketplace_core::models::{EngagementStatus, MilestoneCompletion, MilestoneSpec, PayoutType};
use marketplace_core::{EngagementRepo, MarketplaceError, PayoutRepo, ReviewRepo, SqliteStore};
use std::sync::Arc;

#[tokio::test]
async fn engagement_keeps_milestones_in_order_and_open() {
  let store = fresh_store().await;
  let (_provider, service_id) = provider_with_service(&store, "500").await;
  let client = register(&store, "client", "Cleo", "cleo@example.com").await;

  let engagement_id = engagement_with(
    &store,
    &client,
    service_id,
    &[("Draft", 200.0), ("Review", 300.0), ("Sign-off", 50.5)],
  )
  .await;

  let view = store.get_engagement_with_milestones(engagement_id).await.unwrap().unwrap();
  assert_eq!(view.engagement.engagement.status, EngagementStatus::Active);
  assert_eq!(view.engagement.engagement.client_id, client.id);
  assert_eq!(view.engagement.client_name, "Cleo");
  assert_eq!(view.engagement.provider_name, "Pat Provider");

  let titles: Vec<_> = view.milestones.iter().map(|m| m.title.as_str()).collect();
  assert_eq!(titles, vec!["Draft", "Review", "Sign-off"]);
  let amounts: Vec<_> = view.milestones.iter().map(|m| m.amount).collect();
  assert_eq!(amounts, vec![200.0, 300.0, 50.5]);
  assert!(view.milestones.iter().all(|m| !m.is_completed && m.completed_at.is_none()));
}

#[tokio::test]
async fn rejected_engagement_writes_nothing() {
  let store = fresh_store().await;
  let (provider, service_id) = provider_with_service(&store, "500").await;
  let client = register(&store, "client", "Cleo", "cleo@example.com").await;

  let empty = engagements::open_engagement(&store, &client, service_id, vec![]).await;
  assert!(matches!(empty, Err(MarketplaceError::Validation(m)) if m == "Please add at least one milestone"));

  let bad_amount = engagements::open_engagement(
    &store,
    &client,
    service_id,
    vec![MilestoneSpec::new("Draft", 100.0), MilestoneSpec::new("Review", -3.0)],
  )
  .await;
  assert!(bad_amount.is_err());

  let missing_service =
    engagements::open_engagement(&store, &client, 9_999, vec![MilestoneSpec::new("Draft", 1.0)]).await;
  assert!(matches!(missing_service, Err(MarketplaceError::NotFound { entity: "service", .. })));

  let provider_as_client =
    engagements::open_engagement(&store, &provider, service_id, vec![MilestoneSpec::new("Draft", 1.0)]).await;
  assert!(provider_as_client.is_err());

  let engagements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM engagements")
    .fetch_one(store.pool())
    .await
    .unwrap();
  let milestones: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milestones")
    .fetch_one(store.pool())
    .await
    .unwrap();
  assert_eq!((engagements, milestones), (0, 0));
}

#[tokio::test]
async fn completing_a_milestone_pays_the_provider_once() {
  let store = fresh_store().await;
  let (provider, service_id) = provider_with_service(&store, "500").await;
  let client = register(&store, "client", "Cleo", "cleo@example.com").await;
  let engagement_id = engagement_with(&store, &client, service_id, &[("Draft", 200.0)]).await;
  let milestone_id = store.list_milestones(engagement_id).await.unwrap()[0].id;

  let first = engagements::complete_milestone(&store, milestone_id).await.unwrap();
  let payout = first.payout().expect("first completion issues a payout").clone();
  assert_eq!(payout.provider_id, provider.id);
  assert_eq!(payout.engagement_id, Some(engagement_id));
  assert_eq!(payout.amount, 200.0);
  assert_eq!(payout.payout_type, PayoutType::Milestone);

  let second = engagements::complete_milestone(&store, milestone_id).await.unwrap();
  assert!(matches!(second, MilestoneCompletion::AlreadyCompleted));

  let payouts = store.provider_payouts(provider.id).await.unwrap();
  assert_eq!(payouts.len(), 1);
  assert_eq!(payouts[0].id, payout.id);

  let milestone = &store.list_milestones(engagement_id).await.unwrap()[0];
  assert!(milestone.is_completed);
  assert!(milestone.completed_at.is_some());
}

#[tokio::test]
async fn unknown_milestone_is_not_found() {
  let store = fresh_store().await;
  let result = engagements::complete_milestone(&store, 42).await;
  assert!(matches!(result, Err(MarketplaceError::NotFound { entity: "milestone", id: 42 })));
}

#[tokio::test]
async fn concurrent_completions_issue_a_single_payout() {
  let store = Arc::new(fresh_store().await);
  let (provider, service_id) = provider_with_service(store.as_ref(), "500").await;
  let client = register(store.as_ref(), "client", "Cleo", "cleo@example.com").await;
  let engagement_id = engagement_with(store.as_ref(), &client, service_id, &[("Draft", 200.0)]).await;
  let milestone_id = store.list_milestones(engagement_id).await.unwrap()[0].id;

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let store: Arc<SqliteStore> = Arc::clone(&store);
      tokio::spawn(async move { engagements::complete_milestone(store.as_ref(), milestone_id).await })
    })
    .collect();

  let mut issued = 0;
  for task in tasks {
    if task.await.unwrap().unwrap().payout().is_some() {
      issued += 1;
    }
  }
  assert_eq!(issued, 1);
  assert_eq!(store.provider_payouts(provider.id).await.unwrap().len(), 1);
  assert_eq!(store.provider_earnings(provider.id).await.unwrap(), 200.0);
}

#[tokio::test]
async fn end_to_end_earnings_follow_completed_milestones() {
  let store = fresh_store().await;
  let (provider, service_id) = provider_with_service(&store, "500").await;
  let client = register(&store, "client", "Cleo", "cleo@example.com").await;

  assert_eq!(store.provider_earnings(provider.id).await.unwrap(), 0.0);

  let engagement_id = engagement_with(&store, &client, service_id, &[("Draft", 200.0), ("Review", 300.0)]).await;
  let milestones = store.list_milestones(engagement_id).await.unwrap();

  engagements::complete_milestone(&store, milestones[0].id).await.unwrap();
  assert_eq!(store.provider_earnings(provider.id).await.unwrap(), 200.0);

  engagements::complete_milestone(&store, milestones[1].id).await.unwrap();
  assert_eq!(store.provider_earnings(provider.id).await.unwrap(), 500.0);

  let provider_view = store.list_engagements_for_provider(provider.id).await.unwrap();
  assert_eq!(provider_view.len(), 1);
  assert_eq!(provider_view[0].counterpart_name, "Cleo");
  let client_view = store.list_engagements_for_client(client.id).await.unwrap();
  assert_eq!(client_view.len(), 1);
  assert_eq!(client_view[0].counterpart_name, "Pat Provider");
  assert_eq!(client_view[0].service_title, "Contract Drafting");
}

#[tokio::test]
async fn reviews_need_an_engagement_and_a_sane_rating() {
  let store = fresh_store().await;
  let (_provider, service_id) = provider_with_service(&store, "500").await;
  let client = register(&store, "client", "Cleo", "cleo@example.com").await;
  let engagement_id = engagement_with(&store, &client, service_id, &[("Draft", 200.0)]).await;

  assert!(engagements::leave_review(&store, engagement_id, 0, None).await.is_err());
  assert!(engagements::leave_review(&store, engagement_id, 6, None).await.is_err());
  assert!(matches!(
    engagements::leave_review(&store, 777, 4, None).await,
    Err(MarketplaceError::NotFound { entity: "engagement", .. })
  ));

  engagements::leave_review(&store, engagement_id, 5, Some("  Sharp work ".to_string()))
    .await
    .unwrap();
  let reviews = store.list_reviews(engagement_id).await.unwrap();
  assert_eq!(reviews.len(), 1);
  assert_eq!(reviews[0].rating, 5);
  assert_eq!(reviews[0].comment.as_deref(), Some("Sharp work"));
}

//! Integration tests for the campaign status workflow and public browsing.

mod common;

use common::{fixtures, TestHarness};
use axum::http::StatusCode;
use serde_json::json;
use server_core::domains::campaigns::models::{Campaign, CampaignStatus};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn test_create_campaign_lands_in_pending(ctx: &TestHarness) {
    let api = ctx.api();
    let (_org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let token = ctx.token_for(&owner);

    let res = api
        .post(
            "/api/campaigns",
            Some(&token),
            json!({
                "title": "Clean Water For All",
                "description": "Wells for three villages",
                "funding_goal": "5000.00",
                "category": "healthcare",
                "tags": ["urgent", "International"],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["status"], "pending");
    assert!(res.body["slug"]
        .as_str()
        .unwrap()
        .starts_with("clean-water-for-all-"));

    // Pending campaigns are invisible to the public
    let slug = res.body["slug"].as_str().unwrap();
    let public = api.get(&format!("/api/campaigns/{}", slug), None).await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);

    // But visible to their owner, review fields included
    let own = api.get(&format!("/api/campaigns/{}", slug), Some(&token)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["tags"].as_array().unwrap().len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_create_campaign_validates_input(ctx: &TestHarness) {
    let api = ctx.api();
    let (_org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let token = ctx.token_for(&owner);

    let res = api
        .post(
            "/api/campaigns",
            Some(&token),
            json!({
                "title": "Bad Category",
                "description": "x",
                "funding_goal": "100.00",
                "category": "cryptocurrency",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = api
        .post(
            "/api/campaigns",
            Some(&token),
            json!({
                "title": "Zero Goal",
                "description": "x",
                "funding_goal": "0",
                "category": "education",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Title column is VARCHAR(100); over-long input is a client error,
    // not a database error
    let res = api
        .post(
            "/api/campaigns",
            Some(&token),
            json!({
                "title": "t".repeat(150),
                "description": "x",
                "funding_goal": "100.00",
                "category": "education",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].as_str().unwrap().contains("title"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_create_campaign_requires_org_owner(ctx: &TestHarness) {
    let api = ctx.api();
    let donor = fixtures::create_donor(&ctx.db_pool).await.unwrap();
    let token = ctx.token_for(&donor);

    let res = api
        .post(
            "/api/campaigns",
            Some(&token),
            json!({
                "title": "Nope",
                "description": "x",
                "funding_goal": "100.00",
                "category": "education",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_public_list_shows_only_active(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, _owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let active = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let pending = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Pending)
        .await
        .unwrap();

    let res = api
        .get(&format!("/api/campaigns?organisation={}", org.id), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let items = res.body["items"].as_array().unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&active.id.to_string().as_str()));
    assert!(!ids.contains(&pending.id.to_string().as_str()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_close_and_reactivate(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let campaign = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let token = ctx.token_for(&owner);

    let res = api
        .post_empty(&format!("/api/campaigns/{}/close", campaign.id), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "closed");
    assert!(res.body["closed_at"].is_string());

    // Closing again conflicts
    let res = api
        .post_empty(&format!("/api/campaigns/{}/close", campaign.id), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = api
        .post_empty(
            &format!("/api/campaigns/{}/reactivate", campaign.id),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "active");
    assert!(res.body["closed_at"].is_null());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_owner_cannot_touch_foreign_campaign(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, _owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let campaign = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();

    let (_other_org, other_owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let token = ctx.token_for(&other_owner);

    let res = api
        .post_empty(&format!("/api/campaigns/{}/close", campaign.id), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_edit_rejected_campaign_resubmits(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let campaign = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Rejected)
        .await
        .unwrap();
    let token = ctx.token_for(&owner);

    let res = api
        .put(
            &format!("/api/campaigns/{}", campaign.id),
            Some(&token),
            json!({
                "title": "Reworked Title",
                "description": "Addressed the feedback",
                "funding_goal": "750.00",
                "category": "community",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "pending");
    assert_eq!(res.body["title"], "Reworked Title");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_edit_active_campaign_keeps_status(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let campaign = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let token = ctx.token_for(&owner);

    let res = api
        .put(
            &format!("/api/campaigns/{}", campaign.id),
            Some(&token),
            json!({
                "title": "Still Running",
                "description": "Updated copy",
                "funding_goal": "750.00",
                "category": "community",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "active");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_delete_only_drafts(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let token = ctx.token_for(&owner);

    let draft = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Draft)
        .await
        .unwrap();
    let res = api
        .delete(&format!("/api/campaigns/{}", draft.id), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(Campaign::find_by_id(draft.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());

    let active = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let res = api
        .delete(&format!("/api/campaigns/{}", active.id), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_detail_includes_stats_and_progress(ctx: &TestHarness) {
    let api = ctx.api();
    let (org, _owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    // Fixture goal is $1,000.00
    let campaign = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let donor_a = fixtures::create_donor(&ctx.db_pool).await.unwrap();
    let donor_b = fixtures::create_donor(&ctx.db_pool).await.unwrap();
    fixtures::create_donation(&ctx.db_pool, campaign.id, donor_a.id, 200)
        .await
        .unwrap();
    fixtures::create_donation(&ctx.db_pool, campaign.id, donor_b.id, 300)
        .await
        .unwrap();

    let res = api.get(&format!("/api/campaigns/{}", campaign.id), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["total_raised"], 500);
    assert_eq!(res.body["donor_count"], 2);
    assert_eq!(res.body["progress_percent"], 50);
    // Public detail never exposes review fields
    assert!(res.body.get("admin_remarks").is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_list_filters_by_tag(ctx: &TestHarness) {
    use server_core::domains::tags::models::Tag;

    let api = ctx.api();
    let (org, _owner) = fixtures::create_org_with_owner(&ctx.db_pool).await.unwrap();
    let tagged = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let untagged = fixtures::create_campaign(&ctx.db_pool, org.id, CampaignStatus::Active)
        .await
        .unwrap();
    let tags = Tag::set_campaign_tags(tagged.id, &["Rare Birds".to_string()], &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(tags[0].slug, "rare-birds");

    let res = api.get("/api/campaigns?tag=rare-birds", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let ids: Vec<&str> = res.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&tagged.id.to_string().as_str()));
    assert!(!ids.contains(&untagged.id.to_string().as_str()));
}

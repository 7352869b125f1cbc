mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use rentelme::{
    features::listings::models::{Listing, ListingStatus},
    services::store::DocumentStore,
    utilities::timestamp::timestamp_value,
};
use serde_json::json;
use uuid::Uuid;

async fn seed(app: &TestApp, status: ListingStatus) -> Listing {
    let listing = Listing {
        id: Uuid::new_v4(),
        owner_id: "owner-1".to_string(),
        status,
        is_user_active: true,
        ..Default::default()
    };
    app.store.insert_listing(&listing).await.unwrap();
    listing
}

#[tokio::test]
async fn promotion_needs_verified_listing() {
    let app = TestApp::new().await;
    let token = app.token("owner-1");
    let listing = seed(&app, ListingStatus::Pending).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            &format!("/api/v1/listings/{}/promote", listing.id),
            Some(&token),
            json!({"durationDays": 7}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn second_pending_request_is_refused() {
    let app = TestApp::new().await;
    let token = app.token("owner-1");
    let listing = seed(&app, ListingStatus::Verified).await;
    let uri = format!("/api/v1/listings/{}/promote", listing.id);

    let (status, body) = app
        .send_json(Method::POST, &uri, Some(&token), json!({"durationDays": 7}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["duration"], 7);

    let (status, _) = app
        .send_json(Method::POST, &uri, Some(&token), json!({"durationDays": 7}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn out_of_range_duration_is_a_validation_error() {
    let app = TestApp::new().await;
    let token = app.token("owner-1");
    let listing = seed(&app, ListingStatus::Verified).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            &format!("/api/v1/listings/{}/promote", listing.id),
            Some(&token),
            json!({"durationDays": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn premium_lists_only_active_windows() {
    let app = TestApp::new().await;
    let now = Utc::now();

    let mut active = seed(&app, ListingStatus::Verified).await;
    active.is_sponsored = true;
    active.sponsored_at = Some(timestamp_value(now - Duration::days(1)));
    active.sponsored_until = Some(timestamp_value(now + Duration::days(6)));
    app.store.insert_listing(&active).await.unwrap();

    let mut expired = seed(&app, ListingStatus::Verified).await;
    expired.is_sponsored = true;
    expired.sponsored_until = Some(timestamp_value(now - Duration::hours(1)));
    app.store.insert_listing(&expired).await.unwrap();

    let mut unparseable = seed(&app, ListingStatus::Verified).await;
    unparseable.is_sponsored = true;
    unparseable.sponsored_until = Some(json!("soon"));
    app.store.insert_listing(&unparseable).await.unwrap();

    // The feed refreshes from a background subscription.
    let mut body = serde_json::Value::Null;
    for _ in 0..50 {
        let (_, premium) = app
            .send_empty(Method::GET, "/api/v1/listings/premium", None)
            .await;
        body = premium;
        if body["total"] == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    assert_eq!(body["total"], 1);
    assert_eq!(body["listings"][0]["id"], active.id.to_string());
}

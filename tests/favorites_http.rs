mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rentelme::{
    features::listings::models::{Listing, ListingStatus},
    services::store::DocumentStore,
};
use uuid::Uuid;

async fn seed_listing(app: &TestApp) -> Uuid {
    let listing = Listing {
        id: Uuid::new_v4(),
        owner_id: "owner-1".to_string(),
        title: "For Families in Baner".to_string(),
        status: ListingStatus::Verified,
        is_user_active: true,
        ..Default::default()
    };
    app.store.insert_listing(&listing).await.unwrap();
    listing.id
}

#[tokio::test]
async fn like_requires_sign_in() {
    let app = TestApp::new().await;
    let id = seed_listing(&app).await;

    let (status, _) = app
        .send_empty(Method::POST, &format!("/api/v1/favorites/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn toggle_adds_then_removes() {
    let app = TestApp::new().await;
    let token = app.token("tenant-1");
    let id = seed_listing(&app).await;

    let (status, body) = app
        .send_empty(Method::POST, &format!("/api/v1/favorites/{id}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], true);

    let (_, favorites) = app
        .send_empty(Method::GET, "/api/v1/favorites", Some(&token))
        .await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let (_, body) = app
        .send_empty(Method::POST, &format!("/api/v1/favorites/{id}"), Some(&token))
        .await;
    assert_eq!(body["liked"], false);

    let user = app.store.get_user("tenant-1").await.unwrap().unwrap();
    assert!(user.liked.is_empty());
}

#[tokio::test]
async fn deleted_listing_drops_out_of_favorites() {
    let app = TestApp::new().await;
    let token = app.token("tenant-1");
    let kept = seed_listing(&app).await;
    let gone = seed_listing(&app).await;

    for id in [kept, gone] {
        app.send_empty(Method::POST, &format!("/api/v1/favorites/{id}"), Some(&token))
            .await;
    }
    app.store.delete_listing(gone).await.unwrap();

    let (status, favorites) = app
        .send_empty(Method::GET, "/api/v1/favorites", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let favorites = favorites.as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["id"], kept.to_string());

    // The dangling id stays in the liked set; it is only skipped on display.
    let user = app.store.get_user("tenant-1").await.unwrap().unwrap();
    assert_eq!(user.liked.len(), 2);
}

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use rentelme::{
    build_router,
    services::{
        image_store::{ImageStore, ImageUpload},
        store::MemoryStore,
    },
    utilities::{
        app_state::AppState,
        config::Config,
        errors::AppError,
        jwt::{Principal, create_token},
    },
};
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "rentelme-test-boundary";

/// Image host double. Hands out sequential URLs and records deletes.
/// Deletes fail with a remote error while `fail_deletes` is set.
#[derive(Default)]
pub struct FakeImages {
    next: AtomicUsize,
    pub fail_deletes: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, _upload: &ImageUpload) -> Result<String, AppError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.test/image/{n}"))
    }

    async fn delete(&self, display_url: &str) -> Result<(), AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::RemoteOperationError(format!(
                "image host refused to delete {display_url}"
            )));
        }
        self.deleted
            .lock()
            .expect("deleted list lock")
            .push(display_url.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub images: Arc<FakeImages>,
    pub config: Config,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(FakeImages::default());

        let state = AppState::new(store.clone(), images.clone(), config.clone())
            .await
            .expect("state should start");

        Self {
            router: build_router(state),
            store,
            images,
            config,
        }
    }

    pub fn token(&self, uid: &str) -> String {
        let principal = Principal {
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            display_name: Some(format!("User {uid}")),
            photo_url: None,
        };
        create_token(&self.config, &principal, chrono::Duration::hours(1))
            .expect("token should encode")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response expected");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable");

        if body.is_empty() {
            return (status, Value::Null);
        }

        let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
        (status, json)
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        payload: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(Body::from(payload.to_string()))
            .expect("request should build");
        self.send(request).await
    }

    pub async fn send_empty(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("request should build");
        self.send(request).await
    }

    /// Sends a listing form: the `listing_data` JSON part plus one file per
    /// `(category, bytes)` entry.
    pub async fn send_listing_form(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        listing_data: Value,
        files: &[(&str, &[u8])],
    ) -> (StatusCode, Value) {
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"listing_data\"\r\n\r\n{listing_data}\r\n"
            )
            .as_bytes(),
        );
        for (i, (category, bytes)) in files.iter().enumerate() {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image:{category}\"; filename=\"{i}.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body)).expect("request should build");
        self.send(request).await
    }
}

pub fn test_config() -> Config {
    Config {
        jwt_secret_key: "test-secret".to_string(),
        placeholder_image_url: "https://img.test/placeholder.png".to_string(),
        ..Config::default()
    }
}

pub fn listing_data() -> Value {
    serde_json::json!({
        "address": "12 Lane 4",
        "city": "Pune",
        "area": "Kothrud",
        "pincode": "411038",
        "parking": "car-bike",
        "kitchenType": "veg",
        "bedrooms": 2,
        "bathrooms": 1,
        "isNegotiable": true,
        "deposit": "20000",
        "type": ["students", "girls"],
        "price": "12000",
        "description": "Sunny flat near the market",
        "ownerPhone": "9876543210"
    })
}

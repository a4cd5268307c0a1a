use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use reviews_api::{
    application::reviews::service::{ReviewService, ReviewServiceOptions},
    config::{Config, StoreBackend},
    infrastructure::{
        orders::traits::OrderHistory,
        repositories::memory_review_repository::InMemoryReviewRepository,
        settings::{config_settings::ConfigSettingsProvider, traits::AppSettings},
    },
    presentation::http::{middleware::user::UserClaims, routes::create_router, state::AppState},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-jwt-secret";

/// Order history backed by fixed maps: shopper -> orders, order -> products.
#[derive(Clone, Default)]
pub struct FakeOrderHistory {
    orders_by_shopper: HashMap<String, Vec<String>>,
    products_by_order: HashMap<String, Vec<String>>,
    unavailable: bool,
}

impl FakeOrderHistory {
    pub fn with_purchase(mut self, shopper_id: &str, order_id: &str, product_id: &str) -> Self {
        self.orders_by_shopper
            .entry(shopper_id.to_string())
            .or_default()
            .push(order_id.to_string());
        self.products_by_order
            .entry(order_id.to_string())
            .or_default()
            .push(product_id.to_string());
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl OrderHistory for FakeOrderHistory {
    async fn list_orders(&self, shopper_id: &str) -> anyhow::Result<Vec<String>> {
        if self.unavailable {
            anyhow::bail!("order history offline");
        }
        Ok(self
            .orders_by_shopper
            .get(shopper_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_order(&self, order_id: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .products_by_order
            .get(order_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct TestApp {
    pub app: Router,
    pub repository: Arc<InMemoryReviewRepository>,
}

fn build_config(settings: AppSettings) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        review_store: StoreBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        ignore_missing_migrations: true,
        jwt_secret: JWT_SECRET.to_string(),
        require_approval: settings.require_approval,
        approve_new_reviews: settings.approve_new_reviews,
        orders_api_url: None,
        orders_api_token: None,
        orders_api_timeout_seconds: 1,
        store_call_timeout_ms: 1000,
        purchase_check_concurrency: 2,
        allowed_origins: Vec::new(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(AppSettings::default(), FakeOrderHistory::default())
}

pub fn spawn_app_with(settings: AppSettings, orders: FakeOrderHistory) -> TestApp {
    let config = build_config(settings);
    let repository = Arc::new(InMemoryReviewRepository::new());
    let reviews = Arc::new(ReviewService::new(
        repository.clone(),
        Arc::new(ConfigSettingsProvider::from_config(&config)),
        Arc::new(orders),
        ReviewServiceOptions {
            call_timeout: Duration::from_millis(config.store_call_timeout_ms),
            purchase_check_concurrency: config.purchase_check_concurrency,
        },
    ));

    TestApp {
        app: create_router(AppState::new(config, reviews)),
        repository,
    }
}

pub fn token(sub: &str, role: &str) -> String {
    let claims = UserClaims {
        sub: sub.to_string(),
        email: Some(format!("{}@example.com", sub)),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign token")
}

pub fn shopper_token(shopper_id: &str) -> String {
    token(shopper_id, "shopper")
}

pub fn admin_token() -> String {
    token("admin-1", "admin")
}

pub fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("failed to build request")
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub async fn read_text(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("invalid utf8")
}

pub async fn expect_status(
    res: axum::response::Response,
    expected: StatusCode,
) -> axum::response::Response {
    let actual = res.status();

    if actual == expected {
        return res;
    }

    let body = read_text(res).await;
    panic!(
        "HTTP status mismatch. Expected {}, got {}. Response body: {}",
        expected, actual, body
    );
}

/// Imports reviews through the admin API and returns their ids in order.
pub async fn import(app: &Router, reviews: Value) -> Vec<i64> {
    let res = send(
        app,
        request("POST", "/api/v1/admin/reviews", Some(&admin_token()), Some(reviews)),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::CREATED).await).await;
    assert!(
        body["failures"].as_array().is_some_and(|f| f.is_empty()),
        "import failures: {}",
        body["failures"]
    );
    body["created"]
        .as_array()
        .expect("created should be an array")
        .iter()
        .map(|review| review["id"].as_i64().expect("missing id"))
        .collect()
}

pub fn ids(reviews: &Value) -> Vec<i64> {
    reviews
        .as_array()
        .expect("expected an array of reviews")
        .iter()
        .map(|review| review["id"].as_i64().expect("missing id"))
        .collect()
}

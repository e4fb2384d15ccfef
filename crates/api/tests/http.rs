//! End-to-end HTTP tests over an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api::{router, AppState, AuthConfig};
use db::MemoryStore;
use service::{CarService, EngineService, ServiceConfig};

struct TestApp {
    app: Router,
    store: MemoryStore,
}

impl TestApp {
    fn new() -> Self {
        let store = MemoryStore::new();
        let config = ServiceConfig::default();
        let state = AppState::new(
            CarService::new(Arc::new(store.clone()), config.clone()),
            EngineService::new(Arc::new(store.clone()), config),
            AuthConfig::new("test-secret", Duration::from_secs(3600), "admin", "admin123"),
        );
        Self { app: router(state), store }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn token(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "admin", "password": "admin123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    async fn create_engine(&self, token: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/engine",
                Some(token),
                Some(json!({ "displacement": 2.0, "cylinder_count": 4.0, "range": 500.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

fn car_body(brand: &str, engine: &Value) -> Value {
    json!({
        "name": "Model X",
        "year": "2020",
        "brand": brand,
        "fuel_type": "petrol",
        "price": 25000.0,
        "engine": engine,
    })
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));

    let resp = app
        .app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains(r#"http_requests_total{path="/health",method="GET"} 1"#));
}

#[tokio::test]
async fn wrong_credentials_are_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "admin", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn entity_routes_require_a_valid_token() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    let (status, body) = app.send(Method::GET, &format!("/cars/{id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "authorization header required");

    let (status, body) = app.send(Method::GET, &format!("/engine/{id}"), Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");
}

#[tokio::test]
async fn car_lifecycle() {
    let app = TestApp::new();
    let token = app.token().await;
    let engine = app.create_engine(&token).await;
    let engine_id = engine["engine_id"].as_str().unwrap().to_owned();

    let (status, car) = app.send(Method::POST, "/cars", Some(&token), Some(car_body("Acme", &engine))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(car["engine"]["engine_id"], engine_id.as_str());
    let car_id = car["id"].as_str().unwrap().to_owned();

    let (status, fetched) = app.send(Method::GET, &format!("/cars/{car_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, car);

    let mut update = car_body("Acme", &engine);
    update["price"] = json!(30000.0);
    let (status, updated) = app.send(Method::PUT, &format!("/cars/{car_id}"), Some(&token), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 30000.0);
    assert_eq!(updated["created_at"], car["created_at"]);

    let (status, listed) = app.send(Method::GET, "/cars?brand=Acme&isEngine=true", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["engine"]["engine_id"], engine_id.as_str());

    let (_, bare) = app.send(Method::GET, "/cars?brand=Acme", Some(&token), None).await;
    assert!(bare[0].get("engine").is_none());

    let (status, _) = app.send(Method::DELETE, &format!("/cars/{car_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send(Method::DELETE, &format!("/cars/{car_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(app.store.car_count(), 0);
}

#[tokio::test]
async fn car_with_unknown_engine_is_422() {
    let app = TestApp::new();
    let token = app.token().await;
    let ghost = json!({
        "engine_id": Uuid::new_v4(),
        "displacement": 2.0,
        "cylinder_count": 4.0,
        "range": 500.0,
    });

    let (status, body) = app.send(Method::POST, "/cars", Some(&token), Some(car_body("Acme", &ghost))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "missing_reference");
    assert_eq!(app.store.car_count(), 0);
}

#[tokio::test]
async fn invalid_car_names_the_field() {
    let app = TestApp::new();
    let token = app.token().await;
    let engine = app.create_engine(&token).await;
    let mut body = car_body("Acme", &engine);
    body["year"] = json!("1800");

    let (status, resp) = app.send(Method::POST, "/cars", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "validation_error");
    assert_eq!(resp["field"], "year");
}

#[tokio::test]
async fn malformed_input_is_400() {
    let app = TestApp::new();
    let token = app.token().await;

    let (status, body) = app.send(Method::GET, "/cars/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let req = Request::post("/engine")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn engine_in_use_cannot_be_deleted() {
    let app = TestApp::new();
    let token = app.token().await;
    let engine = app.create_engine(&token).await;
    let engine_id = engine["engine_id"].as_str().unwrap().to_owned();
    let (_, car) = app.send(Method::POST, "/cars", Some(&token), Some(car_body("Acme", &engine))).await;

    let (status, body) = app.send(Method::DELETE, &format!("/engine/{engine_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let car_id = car["id"].as_str().unwrap();
    app.send(Method::DELETE, &format!("/cars/{car_id}"), Some(&token), None).await;
    let (status, removed) = app.send(Method::DELETE, &format!("/engine/{engine_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, engine);
    assert_eq!(app.store.engine_count(), 0);
}

#[tokio::test]
async fn engine_update_replaces_magnitudes() {
    let app = TestApp::new();
    let token = app.token().await;
    let engine = app.create_engine(&token).await;
    let engine_id = engine["engine_id"].as_str().unwrap().to_owned();

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/engine/{engine_id}"),
            Some(&token),
            Some(json!({ "displacement": 3.0, "cylinder_count": 6.0, "range": 400.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["displacement"], 3.0);
    assert_eq!(updated["engine_id"], engine_id.as_str());

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/engine/{}", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "displacement": 3.0, "cylinder_count": 6.0, "range": 400.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

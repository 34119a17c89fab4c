#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use argon2::Params;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rentals::config::RentalsConfig;
use rentals::domain::ports::{ImageStore, ResetNotifier};
use rentals::domain::service::Ports;
use rentals::infra::security::Argon2Hasher;
use rentals::Rentals;
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
pub struct RecordingImages {
    pub released: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for RecordingImages {
    async fn release(&self, handle: &str) -> anyhow::Result<()> {
        self.released.lock().unwrap().push(handle.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ResetNotifier for CapturingNotifier {
    async fn send_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub rentals: Rentals,
    pub images: Arc<RecordingImages>,
    pub notifier: Arc<CapturingNotifier>,
}

pub async fn app() -> TestApp {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();

    let images = Arc::new(RecordingImages::default());
    let notifier = Arc::new(CapturingNotifier::default());
    let ports = Ports {
        images: images.clone(),
        notifier: notifier.clone(),
        hasher: Arc::new(Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap())),
    };
    let cfg = RentalsConfig {
        jwt_secret: "integration-secret".into(),
        ..Default::default()
    };
    let rentals = Rentals::with_ports(db, &cfg, ports);
    rentals.migrate().await.unwrap();
    let router = rentals.register_rest(Router::new()).unwrap();

    TestApp {
        router,
        rentals,
        images,
        notifier,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    /// Registers and returns `(token, id)`.
    pub async fn register(&self, first: &str, email: &str, birth: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/users/register",
                None,
                Some(json!({
                    "firstName": first,
                    "lastName": "Test",
                    "email": email,
                    "password": "password123",
                    "birthDate": birth,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["data"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// A registered account promoted to admin. Roles are read per request,
    /// so the registration token already carries admin rights.
    pub async fn admin(&self, email: &str) -> (String, String) {
        let (token, id) = self.register("Admin", email, "1980-01-01").await;
        self.rentals.service().promote_to_admin(email).await.unwrap();
        (token, id)
    }

    pub async fn create_flat(&self, token: &str, fields: Value) -> String {
        let mut body = json!({
            "title": "Flat",
            "city": "Cluj-Napoca",
            "streetName": "Main",
            "streetNumber": 1,
            "areaSize": 50.0,
            "hasAc": false,
            "yearBuilt": 2000,
            "rentPrice": 500.0,
            "dateAvailable": "2025-01-01",
            "imageUrl": "https://img.example/flat.jpg",
        });
        if let (Some(base), Some(extra)) = (body.as_object_mut(), fields.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        let (status, resp) = self.send(Method::POST, "/flats", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{resp}");
        resp["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn prices(body: &Value) -> Vec<f64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["rentPrice"].as_f64().unwrap())
        .collect()
}

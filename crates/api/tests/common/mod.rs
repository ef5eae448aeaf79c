#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use beacon_api::config::ServerConfig;
use beacon_api::middleware::tenant::TENANT_HEADER;
use beacon_api::routes;
use beacon_api::state::AppState;
use beacon_core::template::EmailRenderer;
use beacon_core::types::DbId;
use beacon_events::{
    BatchDelivery, DeliveryConfig, EventBus, ProviderError, SendReceipt, TransactionalEmail,
    TransactionalEmailProvider,
};
use beacon_pipeline::{CampaignDispatcher, PgDispatchStore};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_base_url: "https://app.example.com".to_string(),
    }
}

/// Provider double that accepts every batch, or rejects every batch when
/// built with [`RecordingProvider::rejecting`].
#[derive(Default)]
pub struct RecordingProvider {
    pub sent: Mutex<Vec<TransactionalEmail>>,
    reject: bool,
}

impl RecordingProvider {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.sent.lock().unwrap().iter().map(|m| m.to.len()).collect()
    }
}

#[async_trait]
impl TransactionalEmailProvider for RecordingProvider {
    async fn send(&self, email: &TransactionalEmail) -> Result<SendReceipt, ProviderError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.reject {
            return Err(ProviderError::Api {
                status: 401,
                body: "Key not found".to_string(),
            });
        }
        Ok(SendReceipt {
            message_id: Some("<test@provider>".to_string()),
        })
    }
}

/// Build the full application router with a dispatcher backed by the given
/// pool and provider.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app_with(pool: PgPool, provider: Option<Arc<RecordingProvider>>) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());

    let dispatcher = provider.map(|provider| {
        let delivery = BatchDelivery::new(
            provider,
            DeliveryConfig {
                batch_size: 50,
                batch_delay: Duration::ZERO,
                batch_timeout: Duration::from_secs(5),
                retry_delays: vec![],
            },
        );
        Arc::new(CampaignDispatcher::new(
            Arc::new(PgDispatchStore::new(pool.clone())),
            delivery,
            EmailRenderer::new(config.app_base_url.as_str()),
            Arc::clone(&event_bus),
        ))
    });

    let state = AppState { pool, dispatcher };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TENANT_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the app with an always-accepting provider.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Some(Arc::new(RecordingProvider::default())))
}

/// Send a GET request without a tenant header.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request as `tenant_id`.
pub async fn get_as(app: Router, uri: &str, tenant_id: DbId) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(TENANT_HEADER, tenant_id.to_string())
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an empty-bodied POST request as `tenant_id`.
pub async fn post_as(app: Router, uri: &str, tenant_id: DbId) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(TENANT_HEADER, tenant_id.to_string())
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an empty-bodied POST request without a tenant header.
pub async fn post(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

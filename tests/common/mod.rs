use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use storefront_api::{
    auth::AdminToken,
    config::AppConfig,
    db,
    errors::ServiceError,
    handlers::AppServices,
    services::razorpay::{CreateGatewayOrderRequest, GatewayOrder, PaymentGatewayApi},
    services::PaymentService,
    AppState,
};
use tower::ServiceExt;

/// Shared secret the test app is configured with.
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";
/// Razorpay key secret used to sign and verify callbacks in tests.
pub const TEST_KEY_SECRET: &str = "rzp_test_secret";

/// Gateway stub returning deterministic order handles without network traffic.
struct StubGateway;

#[async_trait::async_trait]
impl PaymentGatewayApi for StubGateway {
    async fn create_order(
        &self,
        request: CreateGatewayOrderRequest,
    ) -> Result<GatewayOrder, ServiceError> {
        Ok(GatewayOrder {
            id: format!("order_test_{}", request.amount),
            amount: request.amount,
            currency: request.currency,
        })
    }
}

/// Helper harness spinning up the app over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_ADMIN_TOKEN.to_string(),
            "rzp_test_key".to_string(),
            TEST_KEY_SECRET.to_string(),
            "127.0.0.1".to_string(),
            3000,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let payments = Arc::new(PaymentService::new(
            Arc::new(StubGateway),
            "rzp_test_key",
            TEST_KEY_SECRET,
            "INR",
        ));
        let services = AppServices::new(db_arc.clone(), payments);
        let admin_token = AdminToken::new(TEST_ADMIN_TOKEN);

        let state = AppState {
            db: db_arc,
            config: Arc::new(cfg),
            services,
        };

        let router = storefront_api::storefront_routes(&admin_token).with_state(state.clone());

        Self { router, state }
    }

    /// Sends an unauthenticated request.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_inner(method, uri, None, body).await
    }

    /// Sends a request carrying the configured admin token.
    #[allow(dead_code)]
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request_inner(method, uri, Some(TEST_ADMIN_TOKEN), body)
            .await
    }

    /// Sends a request with an arbitrary bearer token.
    #[allow(dead_code)]
    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> Response {
        self.request_inner(method, uri, Some(token), body).await
    }

    async fn request_inner(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    /// Binds the app to an ephemeral local port for real-socket clients.
    #[allow(dead_code)]
    pub async fn spawn(self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            axum::serve(listener, self.router.into_make_service())
                .await
                .expect("test server");
        });
        addr
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

//! Reference implementation of the API contract the harness targets.
//!
//! [`MockApi`] answers the public and protected endpoints the way a real
//! deployment is expected to, so suites can run without one:
//!
//! | Route | Auth | Behavior |
//! |-------|------|----------|
//! | `GET /health` | no | `{status: "ok", version}` |
//! | `GET /items[?category=]` | no | item array, optionally filtered |
//! | `GET /profile` | bearer | the caller's profile |
//! | `PUT /profile` | bearer | merges the body into the profile |
//! | `POST /orders` | bearer | `201` with the created order, `400` on bad items |
//!
//! Every route is also reachable under `/{version}` (default `v1`) so the
//! versioned [`ApiClient`](apiprobe_client::ApiClient) can talk to it.
//!
//! The same instance can be used in-process through [`MockApi::target`] or
//! over loopback TCP through [`MockApi::spawn`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use apiprobe_auth::{TokenClaims, TokenService, DEFAULT_USER_NAME};
use apiprobe_config::HarnessConfig;
use apiprobe_test::{json_response, HandlerResponse, Target, TestError, TestRequest};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// In-memory API serving the harness's reference contract.
///
/// Cloning shares state: profile updates made through one clone are seen by
/// all of them.
#[derive(Clone)]
pub struct MockApi {
    inner: Arc<Inner>,
}

struct Inner {
    tokens: TokenService,
    version: String,
    items: Vec<Value>,
    profiles: RwLock<HashMap<String, Map<String, Value>>>,
}

impl MockApi {
    /// Creates an API that accepts tokens signed by `tokens`.
    pub fn new(tokens: TokenService) -> Self {
        Self::with_version(tokens, "v1")
    }

    /// Creates an API whose routes are also served under `/{version}`.
    pub fn with_version(tokens: TokenService, version: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                tokens,
                version: version.into(),
                items: catalog(),
                profiles: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Creates an API matching the configured secret and version.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::with_version(TokenService::from_config(config), config.api_version.clone())
    }

    /// Returns an in-process target backed by this API.
    pub fn target(&self) -> Target {
        let api = self.clone();
        Target::in_process(move |request| {
            let api = api.clone();
            async move { api.handle(&request) }
        })
    }

    /// Binds a loopback listener on an ephemeral port and serves this API.
    pub async fn spawn(&self) -> std::io::Result<MockServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(self.clone().serve(listener));
        tracing::debug!(%addr, "reference API listening");
        Ok(MockServer { addr, task })
    }

    /// Serves HTTP/1 connections from `listener` until the task is dropped.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let api = self.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let api = api.clone();
                    async move { Ok::<_, Infallible>(api.handle_incoming(req).await) }
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(%peer_addr, error = %e, "connection error");
                }
            });
        }
    }

    async fn handle_incoming(&self, req: Request<Incoming>) -> HandlerResponse {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => return error(StatusCode::BAD_REQUEST, &format!("unreadable body: {e}")),
        };
        self.handle(&TestRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    /// Answers a single request.
    pub fn handle(&self, request: &TestRequest) -> HandlerResponse {
        let path = self.route_path(request.uri.path());
        let response = match (request.method.as_str(), path) {
            ("GET", "/health") => health(),
            ("GET", "/items") => self.items(request.uri.query()),
            ("GET", "/profile") => self.with_auth(request, |claims| self.profile(claims)),
            ("PUT", "/profile") => {
                self.with_auth(request, |claims| self.update_profile(claims, request))
            }
            ("POST", "/orders") => self.with_auth(request, |claims| create_order(claims, request)),
            (_, "/health" | "/items" | "/profile" | "/orders") => {
                error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
            }
            _ => error(StatusCode::NOT_FOUND, "Not Found"),
        };

        tracing::debug!(
            http.method = %request.method,
            http.path = %request.uri,
            http.status = response.status().as_u16(),
            "reference API answered"
        );
        response
    }

    fn route_path<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix('/')
            .and_then(|p| p.strip_prefix(self.inner.version.as_str()))
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(path)
    }

    fn with_auth(
        &self,
        request: &TestRequest,
        f: impl FnOnce(&TokenClaims) -> HandlerResponse,
    ) -> HandlerResponse {
        match request
            .bearer_token()
            .and_then(|token| self.inner.tokens.verify_token(token))
        {
            Some(claims) => f(&claims),
            None => error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        }
    }

    fn items(&self, query: Option<&str>) -> HandlerResponse {
        let category = query.and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "category")
                .map(|(_, value)| value.into_owned())
        });

        let items: Vec<&Value> = self
            .inner
            .items
            .iter()
            .filter(|item| category.as_deref().map_or(true, |c| item["category"] == c))
            .collect();
        json_response(StatusCode::OK, &json!(items))
    }

    fn profile(&self, claims: &TokenClaims) -> HandlerResponse {
        let profiles = self.inner.profiles.read();
        let profile = profiles
            .get(&claims.user_id)
            .cloned()
            .unwrap_or_else(|| base_profile(claims));
        json_response(StatusCode::OK, &Value::Object(profile))
    }

    fn update_profile(&self, claims: &TokenClaims, request: &TestRequest) -> HandlerResponse {
        let Ok(Value::Object(updates)) = request.json::<Value>() else {
            return error(StatusCode::BAD_REQUEST, "Profile update must be a JSON object");
        };

        let mut profiles = self.inner.profiles.write();
        let profile = profiles
            .entry(claims.user_id.clone())
            .or_insert_with(|| base_profile(claims));
        for (key, value) in updates {
            if key != "id" {
                profile.insert(key, value);
            }
        }
        json_response(StatusCode::OK, &Value::Object(profile.clone()))
    }
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi")
            .field("version", &self.inner.version)
            .field("items", &self.inner.items.len())
            .finish_non_exhaustive()
    }
}

/// A running loopback instance of [`MockApi`]. Stops when dropped.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MockServer {
    /// The bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A network target pointing at this server.
    pub fn target(&self) -> Result<Target, TestError> {
        Target::url(self.url())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn health() -> HandlerResponse {
    json_response(
        StatusCode::OK,
        &json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}),
    )
}

fn create_order(claims: &TokenClaims, request: &TestRequest) -> HandlerResponse {
    let Ok(order) = request.json::<Value>() else {
        return error(StatusCode::BAD_REQUEST, "Order must be a JSON object");
    };

    let items = match order.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return error(StatusCode::BAD_REQUEST, "Order must contain at least one item"),
    };

    for (index, item) in items.iter().enumerate() {
        let product_ok = item
            .get("productId")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        let quantity_ok = item
            .get("quantity")
            .and_then(Value::as_u64)
            .is_some_and(|q| q > 0);
        if !product_ok || !quantity_ok {
            return error(
                StatusCode::BAD_REQUEST,
                &format!("Item {index} needs a productId and a positive quantity"),
            );
        }
    }

    json_response(
        StatusCode::CREATED,
        &json!({
            "id": Uuid::now_v7().to_string(),
            "userId": claims.user_id,
            "items": items,
            "shippingAddress": order.get("shippingAddress").cloned().unwrap_or(Value::Null),
            "status": "pending",
            "createdAt": chrono::Utc::now().to_rfc3339(),
        }),
    )
}

fn base_profile(claims: &TokenClaims) -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("id".into(), Value::String(claims.user_id.clone()));
    profile.insert("email".into(), Value::String(claims.email.clone()));
    profile.insert("name".into(), Value::String(DEFAULT_USER_NAME.into()));
    profile
}

fn error(status: StatusCode, message: &str) -> HandlerResponse {
    json_response(status, &json!({"error": message}))
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": "item-1", "name": "Laptop", "category": "electronics", "price": 999.99}),
        json!({"id": "item-2", "name": "Headphones", "category": "electronics", "price": 149.5}),
        json!({"id": "item-3", "name": "Rust in Action", "category": "books", "price": 39.0}),
        json!({"id": "item-4", "name": "Rain Jacket", "category": "clothing", "price": 89.0}),
        json!({"id": "item-5", "name": "E-Reader", "category": "electronics", "price": 129.0}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_auth::TestUser;
    use apiprobe_test::TestResponse;
    use std::time::Duration;

    fn api() -> (MockApi, TokenService) {
        let tokens = TokenService::new("mock_secret", Duration::from_secs(60));
        (MockApi::new(tokens.clone()), tokens)
    }

    fn status(response: &HandlerResponse) -> u16 {
        response.status().as_u16()
    }

    #[test]
    fn test_route_path_strips_version() {
        let (api, _) = api();
        assert_eq!(api.route_path("/v1/items"), "/items");
        assert_eq!(api.route_path("/items"), "/items");
        assert_eq!(api.route_path("/v1"), "/v1");
        assert_eq!(api.route_path("/v10/items"), "/v10/items");
    }

    #[test]
    fn test_health_and_unknown_routes() {
        let (api, _) = api();
        let request = TestRequest::get("/health").build().unwrap();
        assert_eq!(status(&api.handle(&request)), 200);

        let request = TestRequest::get("/nope").build().unwrap();
        assert_eq!(status(&api.handle(&request)), 404);

        let request = TestRequest::delete("/items").build().unwrap();
        assert_eq!(status(&api.handle(&request)), 405);
    }

    #[test]
    fn test_protected_routes_require_valid_token() {
        let (api, _) = api();
        let request = TestRequest::get("/profile").build().unwrap();
        assert_eq!(status(&api.handle(&request)), 401);

        let foreign = TokenService::new("other_secret", Duration::from_secs(60));
        let token = foreign.generate_token(&TestUser::default()).unwrap();
        let request = TestRequest::get("/profile").bearer_token(token).build().unwrap();
        assert_eq!(status(&api.handle(&request)), 401);
    }

    #[test]
    fn test_order_validation() {
        let (api, tokens) = api();
        let token = tokens.generate_token(&TestUser::default()).unwrap();

        for body in [
            json!({"items": []}),
            json!({}),
            json!({"items": [{"productId": "p", "quantity": 0}]}),
            json!({"items": [{"quantity": 1}]}),
        ] {
            let request = TestRequest::post("/orders")
                .bearer_token(&token)
                .json(&body)
                .build()
                .unwrap();
            assert_eq!(status(&api.handle(&request)), 400, "body: {body}");
        }

        let request = TestRequest::post("/orders")
            .bearer_token(&token)
            .json(&json!({"items": [{"productId": "p", "quantity": 1}]}))
            .build()
            .unwrap();
        assert_eq!(status(&api.handle(&request)), 201);
    }

    #[tokio::test]
    async fn test_profile_updates_are_kept_per_user() {
        let (api, tokens) = api();
        let token = tokens.generate_token(&TestUser::default()).unwrap();

        let request = TestRequest::put("/profile")
            .bearer_token(&token)
            .json(&json!({"name": "Updated", "id": "hijack"}))
            .build()
            .unwrap();
        assert_eq!(status(&api.handle(&request)), 200);

        let request = TestRequest::get("/v1/profile").bearer_token(&token).build().unwrap();
        let response = TestResponse::from_http(api.handle(&request)).await.unwrap();
        response
            .assert_status_code(200)
            .assert_json_field("name", &json!("Updated"))
            .assert_json_field("id", &json!("test-user-id"));

        let other = tokens
            .generate_token(&TestUser::with_overrides(&json!({"id": "someone-else"})).unwrap())
            .unwrap();
        let request = TestRequest::get("/profile").bearer_token(&other).build().unwrap();
        let response = TestResponse::from_http(api.handle(&request)).await.unwrap();
        response.assert_json_field("name", &json!(DEFAULT_USER_NAME));
    }

    #[tokio::test]
    async fn test_items_filter() {
        let (api, _) = api();
        let request = TestRequest::get("/items?category=books").build().unwrap();
        let response = TestResponse::from_http(api.handle(&request)).await.unwrap();

        let items: Vec<Value> = response.json().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["category"], "books");
    }

    #[tokio::test]
    async fn test_spawned_server_url() {
        let (api, _) = api();
        let server = api.spawn().await.unwrap();
        assert!(server.url().starts_with("http://127.0.0.1:"));
        assert!(matches!(server.target(), Ok(Target::Url(_))));
    }
}

//! Test client bound to a network URL or an in-process handler.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use http_body_util::Full;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

/// Response type produced by in-process handlers.
pub type HandlerResponse = http::Response<Full<Bytes>>;

/// Handler function type for in-process targets.
pub type TestHandler = Arc<
    dyn Fn(TestRequest) -> Pin<Box<dyn Future<Output = HandlerResponse> + Send>> + Send + Sync,
>;

/// Where requests are sent.
///
/// The same test code runs unchanged against either variant.
#[derive(Clone)]
pub enum Target {
    /// A running server reached over the network.
    Url(Url),
    /// A handler invoked directly, without network I/O.
    InProcess(TestHandler),
}

impl Target {
    /// Parses a base URL target.
    ///
    /// # Errors
    ///
    /// Returns `TestError::RequestBuild` if `base` is not an absolute URL.
    pub fn url(base: impl AsRef<str>) -> Result<Self, TestError> {
        let base = base.as_ref();
        let url = Url::parse(base)
            .map_err(|e| TestError::RequestBuild(format!("Invalid base URL '{base}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(TestError::RequestBuild(format!(
                "Invalid base URL '{base}': cannot be a base"
            )));
        }
        Ok(Self::Url(url))
    }

    /// Wraps an async handler as an in-process target.
    pub fn in_process<F, Fut>(handler: F) -> Self
    where
        F: Fn(TestRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        Self::InProcess(Arc::new(move |req| Box::pin(handler(req))))
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
            Self::InProcess(_) => f.write_str("InProcess"),
        }
    }
}

/// Builds a request-issuing client bound to `target`.
///
/// # Example
///
/// ```ignore
/// use apiprobe_test::{create_request, RequestFactory, Target};
///
/// let request = create_request(Target::url("http://localhost:3000")?);
/// let response = request.get("/health").send().await;
/// assert_eq!(response.status_code(), 200);
/// ```
pub fn create_request(target: impl Into<Target>) -> TestClient {
    TestClient::new(target)
}

/// Something that hands out request builders for every HTTP verb.
///
/// Implementors only provide [`request`](Self::request); the verb methods
/// delegate to it.
pub trait RequestFactory {
    /// Creates a request builder with a custom method.
    fn request(&self, method: Method, path: &str) -> TestClientRequest<'_>;

    /// Creates a GET request builder.
    fn get(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Creates a POST request builder.
    fn post(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Creates a PUT request builder.
    fn put(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Creates a PATCH request builder.
    fn patch(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Creates a DELETE request builder.
    fn delete(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Creates a HEAD request builder.
    fn head(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::HEAD, path)
    }

    /// Creates an OPTIONS request builder.
    fn options(&self, path: &str) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, path)
    }
}

/// A client for issuing test requests against a [`Target`].
///
/// Cloning is cheap: the in-process handler is shared and the network
/// client pools connections internally.
#[derive(Clone)]
#[must_use]
pub struct TestClient {
    target: Target,
    http: reqwest::Client,
    /// Default headers to add to all requests.
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a new test client bound to `target`.
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            http: reqwest::Client::new(),
            default_headers: Vec::new(),
        }
    }

    /// Creates an in-process test client from a handler function.
    pub fn in_process<F, Fut>(handler: F) -> Self
    where
        F: Fn(TestRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        Self::new(Target::in_process(handler))
    }

    /// Creates an in-process client that echoes the request back as JSON.
    ///
    /// The body is `{"method", "path", "query", "headers", "body"}`.
    pub fn echo() -> Self {
        Self::in_process(|req| async move {
            let headers: serde_json::Map<String, serde_json::Value> = req
                .headers
                .iter()
                .map(|(name, value)| {
                    let value = value.to_str().unwrap_or_default().to_string();
                    (name.as_str().to_string(), serde_json::Value::String(value))
                })
                .collect();
            let body = req
                .json::<serde_json::Value>()
                .unwrap_or(serde_json::Value::Null);
            let echoed = serde_json::json!({
                "method": req.method.as_str(),
                "path": req.uri.path(),
                "query": req.uri.query(),
                "headers": headers,
                "body": body,
            });
            json_response(StatusCode::OK, &echoed)
        })
    }

    /// Creates an in-process client that always returns a fixed response.
    pub fn fixed_response(status: StatusCode, body: impl Into<String>) -> Self {
        let body = Bytes::from(body.into());
        Self::in_process(move |_req| {
            let body = body.clone();
            async move {
                let mut response = http::Response::new(Full::new(body));
                *response.status_mut() = status;
                response
            }
        })
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the target this client is bound to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Sends a built request and returns the response.
    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        match &self.target {
            Target::InProcess(handler) => {
                tracing::debug!(
                    http.method = %request.method,
                    http.path = %request.uri,
                    "sending in-process request"
                );
                let handler = Arc::clone(handler);
                let response = (handler)(request).await;
                TestResponse::from_http(response).await
            }
            Target::Url(base) => {
                let url = join_url(base, &request);
                let method = request.method;
                tracing::debug!(http.method = %method, http.url = %url, "sending request");

                let response = self
                    .http
                    .request(method.clone(), &url)
                    .headers(request.headers)
                    .body(request.body)
                    .send()
                    .await
                    .map_err(|source| {
                        tracing::error!(
                            http.method = %method,
                            http.url = %url,
                            error = %source,
                            "request failed"
                        );
                        TestError::Transport {
                            method: method.clone(),
                            url: url.clone(),
                            source,
                        }
                    })?;

                TestResponse::from_reqwest(response).await
            }
        }
    }
}

impl RequestFactory for TestClient {
    fn request(&self, method: Method, path: &str) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, path))
    }
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("target", &self.target)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a test client.
///
/// Headers pinned by a decorating factory (such as the authenticated
/// client's `Authorization`) are applied last and cannot be replaced.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
    pinned: HeaderMap,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self {
            client,
            builder,
            pinned: HeaderMap::new(),
        }
    }

    /// Pins a header so later `header` calls for the same name are ignored.
    pub fn pin_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.pinned.insert(name, value);
        self
    }

    /// Sets a header on the request.
    ///
    /// Ignored (with a debug log) if the header is pinned.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if self.pinned.contains_key(name.as_ref()) {
            tracing::debug!(header = name.as_ref(), "ignoring override of pinned header");
            return self;
        }
        self.builder = self.builder.header(name, value);
        self
    }

    /// Alias for [`header`](Self::header).
    pub fn set(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.header(name, value)
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            http::header::AUTHORIZATION.as_str(),
            apiprobe_auth::bearer_value(token.as_ref()),
        )
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Builds the request without sending it.
    pub fn build(self) -> Result<TestRequest, TestError> {
        let mut builder = self.builder;
        for (name, value) in &self.pinned {
            builder = builder.header_typed(name.clone(), value.clone());
        }
        builder.build()
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the target cannot be
    /// reached. Use [`try_send`](Self::try_send) to handle those cases.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("request should succeed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let client = self.client;
        let request = self.build()?;
        client.send_internal(request).await
    }
}

/// Joins a request's path and query onto a base URL.
///
/// Absolute request URIs are used as-is.
fn join_url(base: &Url, request: &TestRequest) -> String {
    if request.uri.scheme().is_some() {
        return request.uri.to_string();
    }
    let path_and_query = request
        .uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);
    let base = base.as_str().trim_end_matches('/');
    if path_and_query.starts_with('/') {
        format!("{base}{path_and_query}")
    } else {
        format!("{base}/{path_and_query}")
    }
}

/// Builds a JSON response for in-process handlers.
pub fn json_response(status: StatusCode, body: &serde_json::Value) -> HandlerResponse {
    let mut response = http::Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

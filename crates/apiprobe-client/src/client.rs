//! Versioned JSON client for the API under test.

use apiprobe_config::HarnessConfig;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use reqwest::Client;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::response::ApiResponse;

/// Options for [`ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ApiClientOptions {
    /// Base URL of the API, without the version segment.
    pub base_url: String,
    /// Version segment inserted between the base URL and the endpoint.
    pub version: String,
    /// Headers added to every request, over the JSON defaults.
    pub headers: HeaderMap,
}

impl Default for ApiClientOptions {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}

impl ApiClientOptions {
    /// Options pointing at the configured `API_URL` and `API_VERSION`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            version: config.api_version.clone(),
            headers: HeaderMap::new(),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the version segment.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Programmatic client for `{base_url}/{version}/{endpoint}` style APIs.
///
/// Unlike the request factories in `apiprobe-test`, this client returns
/// decoded [`ApiResponse`] values instead of assertion helpers, and carries a
/// mutable credential slot shared by every later call.
///
/// # Example
///
/// ```ignore
/// use apiprobe_client::{ApiClient, ApiClientOptions};
///
/// let mut client = ApiClient::new(ApiClientOptions::default());
/// client.set_auth_token(&token)?;
/// let profile = client.get("/profile", &HeaderMap::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    version: String,
    headers: HeaderMap,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// Requests default to `Content-Type: application/json` and
    /// `Accept: application/json`; `options.headers` override those.
    pub fn new(options: ApiClientOptions) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        merge_headers(&mut headers, &options.headers);

        Self {
            client: Client::new(),
            base_url: options.base_url,
            version: options.version,
            headers,
        }
    }

    /// Create a client for the configured API.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(ApiClientOptions::from_config(config))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the version segment.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Builds the full URL for an endpoint.
    ///
    /// A leading `/` on the endpoint is optional.
    ///
    /// ```
    /// use apiprobe_client::{ApiClient, ApiClientOptions};
    ///
    /// let client = ApiClient::new(ApiClientOptions::default());
    /// assert_eq!(client.get_url("/items"), "http://localhost:3000/v1/items");
    /// assert_eq!(client.get_url("items"), "http://localhost:3000/v1/items");
    /// ```
    pub fn get_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        format!("{}/{}/{}", self.base_url, self.version, endpoint)
    }

    /// Sends `Authorization: Bearer <token>` on every later request.
    pub fn set_auth_token(&mut self, token: &str) -> ClientResult<()> {
        let value = HeaderValue::try_from(apiprobe_auth::bearer_value(token))
            .map_err(|e| ClientError::invalid_header(format!("{AUTHORIZATION}: {e}")))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Stops sending the `Authorization` header.
    pub fn clear_auth_token(&mut self) {
        self.headers.remove(AUTHORIZATION);
    }

    /// Performs a request.
    ///
    /// `custom_headers` win over the client's headers. `data` is sent as a
    /// JSON body for POST, PUT and PATCH only. An empty payload (`null`,
    /// `false`, `0` or `""`) sends no body.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<&Value>,
        custom_headers: &HeaderMap,
    ) -> ClientResult<ApiResponse> {
        let url = self.get_url(endpoint);
        let mut headers = self.headers.clone();
        merge_headers(&mut headers, custom_headers);

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(data) = data.filter(|d| !is_empty_payload(d)) {
            if sends_body(&method) {
                builder = builder.body(serde_json::to_vec(data)?);
            }
        }

        tracing::debug!(http.method = %method, http.url = %url, "sending API request");

        let response = builder.send().await.map_err(|source| {
            tracing::error!(
                http.method = %method,
                http.url = %url,
                error = %source,
                "Error making request"
            );
            ClientError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::BodyRead(e.to_string()))?;

        tracing::debug!(
            http.method = %method,
            http.url = %url,
            http.status = status.as_u16(),
            "received API response"
        );
        ApiResponse::from_parts(status, headers, &body)
    }

    /// Make a GET request.
    pub async fn get(&self, endpoint: &str, headers: &HeaderMap) -> ClientResult<ApiResponse> {
        self.request(Method::GET, endpoint, None, headers).await
    }

    /// Make a POST request.
    pub async fn post(
        &self,
        endpoint: &str,
        data: &Value,
        headers: &HeaderMap,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::POST, endpoint, Some(data), headers).await
    }

    /// Make a PUT request.
    pub async fn put(
        &self,
        endpoint: &str,
        data: &Value,
        headers: &HeaderMap,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::PUT, endpoint, Some(data), headers).await
    }

    /// Make a PATCH request.
    pub async fn patch(
        &self,
        endpoint: &str,
        data: &Value,
        headers: &HeaderMap,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::PATCH, endpoint, Some(data), headers).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, endpoint: &str, headers: &HeaderMap) -> ClientResult<ApiResponse> {
        self.request(Method::DELETE, endpoint, None, headers).await
    }
}

fn sends_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Inserts every header of `overrides` into `headers`, replacing same-name entries.
fn merge_headers(headers: &mut HeaderMap, overrides: &HeaderMap) {
    for name in overrides.keys() {
        headers.remove(name);
    }
    for (name, value) in overrides {
        headers.append(name.clone(), value.clone());
    }
}

//! Authenticated request wrapper.

use crate::client::{create_request, RequestFactory, Target, TestClient, TestClientRequest};
use crate::error::TestError;
use apiprobe_auth::{bearer_value, TestUser, TokenService};
use http::header::AUTHORIZATION;
use http::{HeaderValue, Method};
use serde_json::Value;

/// Options for [`create_authenticated_request`].
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
    /// Fields merged over the default test user. `Value::Null` keeps the defaults.
    pub user: Value,
}

impl AuthOptions {
    /// Creates options with the given user overrides.
    pub fn with_user(user: Value) -> Self {
        Self { user }
    }
}

/// A [`TestClient`] that attaches a bearer credential to every request.
///
/// The `Authorization` header is pinned: calling `.header("Authorization", ..)`
/// on a request from this client has no effect.
#[derive(Clone)]
#[must_use]
pub struct AuthenticatedClient {
    inner: TestClient,
    authorization: HeaderValue,
    token: String,
}

impl AuthenticatedClient {
    /// Wraps `inner` so every request carries `Bearer <token>`.
    pub fn new(inner: TestClient, token: impl Into<String>) -> Result<Self, TestError> {
        let token = token.into();
        let authorization = HeaderValue::try_from(bearer_value(&token))
            .map_err(|e| TestError::InvalidHeader(format!("{AUTHORIZATION}: {e}")))?;
        Ok(Self {
            inner,
            authorization,
            token,
        })
    }

    /// Returns the token attached to requests.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the undecorated client.
    pub fn inner(&self) -> &TestClient {
        &self.inner
    }
}

impl RequestFactory for AuthenticatedClient {
    fn request(&self, method: Method, path: &str) -> TestClientRequest<'_> {
        self.inner
            .request(method, path)
            .pin_header(AUTHORIZATION, self.authorization.clone())
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("inner", &self.inner)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Result of [`create_authenticated_request`].
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// Request factory with the credential attached.
    pub request: AuthenticatedClient,
    /// The user the token was issued for.
    pub user: TestUser,
    /// The signed token.
    pub token: String,
}

/// Creates a test user and a request factory that authenticates as them.
///
/// # Example
///
/// ```ignore
/// use apiprobe_test::{create_authenticated_request, AuthOptions, RequestFactory, Target};
/// use serde_json::json;
///
/// let auth = create_authenticated_request(
///     Target::url("http://localhost:3000")?,
///     &tokens,
///     AuthOptions::with_user(json!({"email": "ada@example.com"})),
/// )?;
/// let response = auth.request.get("/profile").send().await;
/// response.assert_json_field("email", &json!("ada@example.com"));
/// ```
pub fn create_authenticated_request(
    target: impl Into<Target>,
    tokens: &TokenService,
    options: AuthOptions,
) -> Result<AuthenticatedRequest, TestError> {
    let identity = tokens.create_test_user(&options.user)?;
    let request = AuthenticatedClient::new(create_request(target), identity.token.clone())?;
    tracing::debug!(user.id = %identity.user.id, "created authenticated request factory");

    Ok(AuthenticatedRequest {
        request,
        user: identity.user,
        token: identity.token,
    })
}

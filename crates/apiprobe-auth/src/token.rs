//! Token issuance and verification.

use std::time::Duration;

use apiprobe_config::HarnessConfig;
use chrono::Utc;
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuthError;
use crate::user::TestUser;

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Id of the user the token was issued for.
    pub user_id: String,
    /// Email of the user the token was issued for.
    pub email: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// A ready-to-use authenticated identity.
#[derive(Debug, Clone)]
pub struct TestIdentity {
    /// The merged test user.
    pub user: TestUser,
    /// Signed token for `user`.
    pub token: String,
    /// `Authorization: Bearer <token>` as a header map.
    pub auth_header: HeaderMap,
}

/// Formats a token as an `Authorization` header value.
///
/// # Example
///
/// ```
/// assert_eq!(apiprobe_auth::bearer_value("abc"), "Bearer abc");
/// ```
#[must_use]
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

/// Issues and verifies HS256 tokens for synthetic test users.
///
/// The service holds only the secret and the token lifetime, so it is cheap
/// to clone into every test.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiration: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenService {
    /// Creates a token service from a secret and token lifetime.
    pub fn new(secret: impl Into<String>, expiration: Duration) -> Self {
        Self {
            secret: secret.into(),
            expiration,
        }
    }

    /// Creates a token service from the harness configuration.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.jwt_expiration)
    }

    /// Returns the configured token lifetime.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Signs a token for `user`.
    ///
    /// The payload carries `userId` (the placeholder id when `user.id` is
    /// empty) and `email`; `iat` and `exp` are computed at call time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSecret` when the secret is empty and
    /// `AuthError::Signing` if encoding fails.
    pub fn generate_token(&self, user: &TestUser) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let lifetime = i64::try_from(self.expiration.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            user_id: user.token_subject().to_string(),
            email: user.email.clone(),
            iat,
            exp: iat.saturating_add(lifetime),
        };
        self.sign_claims(&claims)
    }

    /// Signs arbitrary claims with the configured secret.
    ///
    /// Useful for exercising an API with already-expired or otherwise
    /// hand-crafted tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSecret` when the secret is empty and
    /// `AuthError::Signing` if encoding fails.
    pub fn sign_claims(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), claims, &key)?)
    }

    /// Verifies a token and returns its payload.
    ///
    /// Returns `None` if the token is malformed, carries a bad signature, or
    /// has expired. The reason is logged, never returned.
    pub fn verify_token(&self, token: &str) -> Option<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        match decode::<TokenClaims>(token, &key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                None
            }
        }
    }

    /// Creates a test user and a signed token for it in one step.
    ///
    /// `custom` is shallow-merged over the default identity (see
    /// [`TestUser::with_overrides`]).
    ///
    /// # Errors
    ///
    /// Fails as a whole if the fields are invalid or signing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use apiprobe_auth::TokenService;
    /// use serde_json::json;
    ///
    /// let tokens = TokenService::new("secret", Duration::from_secs(3600));
    /// let identity = tokens.create_test_user(&json!({"name": "Ada"})).unwrap();
    ///
    /// assert_eq!(identity.user.name, "Ada");
    /// assert_eq!(
    ///     identity.auth_header["authorization"],
    ///     format!("Bearer {}", identity.token),
    /// );
    /// ```
    pub fn create_test_user(&self, custom: &Value) -> Result<TestIdentity, AuthError> {
        let user = TestUser::with_overrides(custom)?;
        let token = self.generate_token(&user)?;

        let mut auth_header = HeaderMap::new();
        auth_header.insert(AUTHORIZATION, HeaderValue::try_from(bearer_value(&token))?);

        tracing::debug!(user_id = %user.id, "created test identity");
        Ok(TestIdentity {
            user,
            token,
            auth_header,
        })
    }

    /// Creates the default test user with a signed token.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn default_test_user(&self) -> Result<TestIdentity, AuthError> {
        self.create_test_user(&Value::Null)
    }
}

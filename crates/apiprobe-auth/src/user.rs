//! Synthetic test users.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// Placeholder id used when a user carries none.
pub const DEFAULT_USER_ID: &str = "test-user-id";
/// Email of the default test user.
pub const DEFAULT_USER_EMAIL: &str = "test@example.com";
/// Name of the default test user.
pub const DEFAULT_USER_NAME: &str = "Test User";

/// A synthetic user record used only to exercise protected endpoints.
///
/// Fields beyond `id`, `email` and `name` are kept in `extra` and serialize
/// at the top level alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    /// User id embedded in the token as `userId`.
    pub id: String,
    /// User email embedded in the token.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Any additional caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_string(),
            email: DEFAULT_USER_EMAIL.to_string(),
            name: DEFAULT_USER_NAME.to_string(),
            extra: Map::new(),
        }
    }
}

impl TestUser {
    /// Builds a user by merging `overrides` over the default identity.
    ///
    /// The merge is shallow and by key: each top-level key in `overrides`
    /// replaces the default wholesale. Anything other than a JSON object
    /// (such as `Value::Null`) means no overrides. A `null` `id`, `email` or
    /// `name` keeps the default for that field.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUser` when an override gives `id`, `email`
    /// or `name` a non-string value.
    ///
    /// # Example
    ///
    /// ```
    /// use apiprobe_auth::TestUser;
    /// use serde_json::json;
    ///
    /// let user = TestUser::with_overrides(&json!({"name": "Ada", "role": "admin"})).unwrap();
    /// assert_eq!(user.name, "Ada");
    /// assert_eq!(user.id, "test-user-id");
    /// assert_eq!(user.extra["role"], "admin");
    /// ```
    pub fn with_overrides(overrides: &Value) -> Result<Self, AuthError> {
        let Some(overrides) = overrides.as_object() else {
            return Ok(Self::default());
        };

        let mut merged = Self::default().into_map();
        for (key, value) in overrides {
            if value.is_null() && Self::is_identity_field(key) {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(merged)).map_err(AuthError::InvalidUser)
    }

    /// Returns the id to embed in a token, falling back to the placeholder.
    #[must_use]
    pub fn token_subject(&self) -> &str {
        if self.id.is_empty() {
            DEFAULT_USER_ID
        } else {
            &self.id
        }
    }

    fn is_identity_field(key: &str) -> bool {
        matches!(key, "id" | "email" | "name")
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        map.insert("id".to_string(), Value::String(self.id));
        map.insert("email".to_string(), Value::String(self.email));
        map.insert("name".to_string(), Value::String(self.name));
        map
    }
}

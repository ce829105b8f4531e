//! Test identities for apiprobe.
//!
//! Issues HS256 bearer tokens for synthetic users so protected endpoints can
//! be exercised without a real login flow.
//!
//! - [`TokenService::generate_token`] signs `{userId, email, iat, exp}`
//! - [`TokenService::verify_token`] decodes a token or yields `None`
//! - [`TokenService::create_test_user`] merges custom fields over the default
//!   identity and returns the user, token and ready `Authorization` header
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use apiprobe_auth::TokenService;
//! use serde_json::json;
//!
//! let tokens = TokenService::new("secret", Duration::from_secs(3600));
//! let identity = tokens.create_test_user(&json!({"email": "ada@example.com"})).unwrap();
//!
//! let claims = tokens.verify_token(&identity.token).unwrap();
//! assert_eq!(claims.email, "ada@example.com");
//! assert_eq!(claims.user_id, "test-user-id");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod token;
mod user;

pub use error::AuthError;
pub use token::{bearer_value, TestIdentity, TokenClaims, TokenService};
pub use user::{TestUser, DEFAULT_USER_EMAIL, DEFAULT_USER_ID, DEFAULT_USER_NAME};

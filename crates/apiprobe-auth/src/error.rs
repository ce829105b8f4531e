//! Token service error types.

use thiserror::Error;

/// Errors that can occur while building a test identity.
///
/// Verification never produces an error; see
/// [`TokenService::verify_token`](crate::TokenService::verify_token).
#[derive(Debug, Error)]
pub enum AuthError {
    /// No signing secret is configured.
    #[error("token signing secret is empty; set JWT_SECRET")]
    MissingSecret,

    /// Custom user fields do not fit the test user shape.
    #[error("invalid test user fields: {0}")]
    InvalidUser(#[source] serde_json::Error),

    /// Signing the token failed.
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token could not be turned into a header value.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

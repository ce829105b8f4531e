//! Status-class assertions for common API outcomes.
//!
//! Each helper panics with the actual status and a body preview on mismatch
//! and hands the response back so further checks can be chained.
//!
//! ```ignore
//! use apiprobe_test::assertions;
//!
//! let response = auth.request.post("/orders").json(&order).send().await;
//! assertions::created(&response).assert_json_has("id");
//! ```

use crate::response::TestResponse;
use http::StatusCode;

/// Asserts a `200 OK` response.
#[track_caller]
pub fn success(response: &TestResponse) -> &TestResponse {
    response.assert_status(StatusCode::OK)
}

/// Asserts a `201 Created` response.
#[track_caller]
pub fn created(response: &TestResponse) -> &TestResponse {
    response.assert_status(StatusCode::CREATED)
}

/// Asserts a `401 Unauthorized` response.
#[track_caller]
pub fn unauthorized(response: &TestResponse) -> &TestResponse {
    response.assert_status(StatusCode::UNAUTHORIZED)
}

/// Asserts a `403 Forbidden` response.
#[track_caller]
pub fn forbidden(response: &TestResponse) -> &TestResponse {
    response.assert_status(StatusCode::FORBIDDEN)
}

/// Asserts a `404 Not Found` response.
#[track_caller]
pub fn not_found(response: &TestResponse) -> &TestResponse {
    response.assert_status(StatusCode::NOT_FOUND)
}

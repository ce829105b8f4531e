//! # apiprobe Test
//!
//! Request factories and response assertions for exercising a REST API from
//! `#[tokio::test]` suites.
//!
//! The same test code runs against a live server or an in-process handler:
//!
//! - [`Target::Url`] sends requests over the network with `reqwest`
//! - [`Target::InProcess`] calls an async handler directly, no port binding
//!
//! ## Example
//!
//! ```ignore
//! use apiprobe_test::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn profile_requires_auth() {
//!     let target = Target::url("http://localhost:3000").unwrap();
//!
//!     let response = create_request(target.clone()).get("/profile").send().await;
//!     assertions::unauthorized(&response);
//!
//!     let auth = create_authenticated_request(target, &tokens, AuthOptions::default()).unwrap();
//!     let response = auth.request.get("/profile").send().await;
//!     assertions::success(&response).assert_json_field("id", &json!(auth.user.id));
//! }
//! ```
//!
//! ## Authenticated requests
//!
//! [`create_authenticated_request`] signs a token for a synthetic user and
//! wraps the factory so every verb carries `Authorization: Bearer <token>`.
//! The header is pinned; callers cannot replace it per request.

#![doc(html_root_url = "https://docs.rs/apiprobe-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assertions;
mod auth;
mod client;
mod error;
mod request;
mod response;

pub use auth::{create_authenticated_request, AuthOptions, AuthenticatedClient, AuthenticatedRequest};
pub use client::{
    create_request, json_response, HandlerResponse, RequestFactory, Target, TestClient,
    TestClientRequest, TestHandler,
};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;

/// Commonly used items for test modules.
pub mod prelude {
    pub use crate::assertions;
    pub use crate::{
        create_authenticated_request, create_request, AuthOptions, RequestFactory, Target,
        TestClient, TestResponse,
    };
}

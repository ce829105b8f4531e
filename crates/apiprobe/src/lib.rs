//! # apiprobe
//!
//! An integration-test harness for REST APIs: signed test identities,
//! request factories that run against a live server or an in-process
//! handler, a versioned JSON client and status assertions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apiprobe::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn orders_require_items() {
//!     let harness = Harness::from_env().unwrap();
//!     let auth = harness.authenticated_request(AuthOptions::default()).unwrap();
//!
//!     let response = auth.request.post("/orders").json(&json!({"items": []})).send().await;
//!     response.assert_status_code(400).assert_json_has("error");
//! }
//! ```
//!
//! ## Crates
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`config`] | `apiprobe-config` | `.env` + environment loading and validation |
//! | [`telemetry`] | `apiprobe-telemetry` | `tracing` subscriber setup |
//! | [`auth`] | `apiprobe-auth` | test users and HS256 bearer tokens |
//! | [`testing`] | `apiprobe-test` | request factories and assertions |
//! | [`client`] | `apiprobe-client` | versioned JSON API client |
//!
//! [`mock::MockApi`] implements the reference API contract for suites that
//! should not depend on a deployment.

#![doc(html_root_url = "https://docs.rs/apiprobe/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use apiprobe_auth as auth;
pub use apiprobe_client as client;
pub use apiprobe_config as config;
pub use apiprobe_telemetry as telemetry;
pub use apiprobe_test as testing;

mod error;
mod harness;
pub mod mock;

pub use error::{HarnessError, HarnessResult};
pub use harness::Harness;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use apiprobe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{TestUser, TokenService};
    pub use crate::client::{ApiClient, ApiClientOptions, ApiResponse, ResponseData};
    pub use crate::config::{ConfigLoader, HarnessConfig};
    pub use crate::mock::{MockApi, MockServer};
    pub use crate::testing::prelude::*;
    pub use crate::{Harness, HarnessError};
}

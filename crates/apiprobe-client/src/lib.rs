//! # apiprobe Client
//!
//! A small JSON client for versioned REST APIs, for programmatic calls that
//! do not need the assertion style of `apiprobe-test`.
//!
//! - URLs are built as `{base_url}/{version}/{endpoint}`
//! - JSON bodies are sent for POST, PUT and PATCH
//! - Responses are decoded as JSON or text by content type
//! - Transport failures are logged and returned; 4xx/5xx are ordinary values
//!
//! ## Example
//!
//! ```ignore
//! use apiprobe_client::{ApiClient, ApiClientOptions, ResponseData};
//! use http::HeaderMap;
//!
//! let client = ApiClient::new(ApiClientOptions::default());
//! let response = client.get("health", &HeaderMap::new()).await?;
//! assert!(response.is_success());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{ApiClient, ApiClientOptions};
pub use error::{ClientError, ClientResult};
pub use response::{ApiResponse, ResponseData};

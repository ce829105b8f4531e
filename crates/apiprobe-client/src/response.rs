//! Responses returned by the API client.

use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientResult;

/// Response payload, decoded according to its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseData {
    /// Body of an `application/json` response.
    Json(Value),
    /// Any other body, as text.
    Text(String),
}

impl ResponseData {
    /// Returns the JSON value, if the response was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if the response was not JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// A response from the API under test.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub data: ResponseData,
}

impl ApiResponse {
    /// Decodes a raw response.
    ///
    /// The body is parsed as JSON when `content-type` contains
    /// `application/json`; an empty JSON body decodes to `null`.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: &Bytes) -> ClientResult<Self> {
        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let data = if is_json {
            if body.is_empty() {
                ResponseData::Json(Value::Null)
            } else {
                ResponseData::Json(serde_json::from_slice(body)?)
            }
        } else {
            ResponseData::Text(String::from_utf8_lossy(body).into_owned())
        };

        Ok(Self {
            status,
            headers,
            data,
        })
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decodes the body into `T`.
    ///
    /// Text bodies are parsed as JSON too, so a mislabelled response can
    /// still be read.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        match &self.data {
            ResponseData::Json(value) => Ok(T::deserialize(value)?),
            ResponseData::Text(text) => Ok(serde_json::from_str(text)?),
        }
    }
}

//! Normalized responses: a status plus a body that is either JSON or text.
//!
//! The service answers some calls with JSON, some with HTML/plain text, and
//! the delete endpoint with an empty body. `Body::normalize` is the single
//! place that decides which shape a payload has; it never fails.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{AuthKey, Pet, PetList};

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Decode `bytes` as JSON, falling back to the raw text verbatim.
    pub fn normalize(bytes: &[u8]) -> Body {
        match serde_json::from_slice(bytes) {
            Ok(value) => Body::Json(value),
            Err(e) => {
                tracing::trace!(error = %e, len = bytes.len(), "body is not JSON, keeping text");
                Body::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// `(status, body)` pair returned by every client call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            body: Body::normalize(&response.body),
        }
    }
}

impl ApiResponse {
    pub fn is_json(&self) -> bool {
        matches!(self.body, Body::Json(_))
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(v) => Some(v),
            Body::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(s) => Some(s),
            Body::Json(_) => None,
        }
    }

    /// Top-level member of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json().and_then(|v| v.get(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Deserialize the JSON body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            Body::Json(v) => serde_json::from_value(v.clone())
                .map_err(|e| ApiError::DeserializationError(e.to_string())),
            Body::Text(s) => Err(ApiError::DeserializationError(format!(
                "expected JSON body, got text ({} bytes) with status {}",
                s.len(),
                self.status
            ))),
        }
    }

    pub fn auth_key(&self) -> Result<AuthKey, ApiError> {
        self.decode()
    }

    pub fn pets(&self) -> Result<Vec<Pet>, ApiError> {
        self.decode::<PetList>().map(|list| list.pets)
    }

    pub fn pet(&self) -> Result<Pet, ApiError> {
        self.decode()
    }
}

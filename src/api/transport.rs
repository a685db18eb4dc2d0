use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::http::{HttpClient, HttpRequest, Method};
use crate::io::session::Session;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An encoded request body and the content type it should be sent with
#[derive(Debug, Clone)]
pub struct Body {
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl Body {
    pub fn json<T: Serialize>(value: &T) -> Result<Body, ApiError> {
        let bytes = serde_json::to_vec(value).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Body {
            content_type: JSON_CONTENT_TYPE,
            bytes,
        })
    }

    pub fn form<T: Serialize>(value: &T) -> Result<Body, ApiError> {
        let text =
            serde_urlencoded::to_string(value).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Body {
            content_type: FORM_CONTENT_TYPE,
            bytes: text.into_bytes(),
        })
    }
}

/// Outbound calls to the API: URL building, auth header, JSON decoding and
/// error normalization. The only place that touches the session besides
/// login/logout.
#[derive(Clone)]
pub struct Transport {
    base_url: String,
    session: Session,
    http: Arc<dyn HttpClient>,
}

impl Transport {
    pub fn new(base_url: &str, session: Session, http: Arc<dyn HttpClient>) -> Self {
        Transport {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and return the parsed JSON body, or `None` when the
    /// response had no body.
    ///
    /// A 401 clears the session before the error is returned, so anything
    /// rendered afterwards sees the logged-out state.
    #[tracing::instrument(level = "debug", skip(self, body))]
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> Result<Option<Value>, ApiError> {
        let content_type = body
            .as_ref()
            .map_or(JSON_CONTENT_TYPE, |b| b.content_type);
        let mut headers = vec![("Content-Type", content_type.to_string())];
        if let Some(token) = self.session.token() {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        let response = self.http.send(HttpRequest {
            method: method.clone(),
            url: self.url(path),
            headers,
            body: body.map(|b| b.bytes),
        })?;

        if !(200..300).contains(&response.status) {
            let message = if response.body.trim().is_empty() {
                format!("Request failed: {}", response.status)
            } else {
                response.body
            };
            if response.status == 401 {
                tracing::warn!(%method, path, "unauthorized; clearing session");
                self.session.clear();
                return Err(ApiError::Unauthorized { message });
            }
            tracing::debug!(status = response.status, "request failed");
            return Err(ApiError::Request {
                status: response.status,
                message,
            });
        }

        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// `request`, decoding the body into `T`. An empty body decodes as JSON
    /// `null`.
    pub fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> Result<T, ApiError> {
        let value = self.request(method, path, body)?.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

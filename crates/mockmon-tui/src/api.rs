//! HTTP client for the mock server API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP verbs a mock can match on
pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"];

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a rejected request, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Ordered header name/value pairs with unique names.
///
/// Serialized as a JSON object. Inserting an existing name replaces its
/// value in place, so display order is the order names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a header (last write wins)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to string values, or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    headers.insert(name, value);
                }
                Ok(headers)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::new())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::new())
            }
        }

        deserializer.deserialize_any(HeadersVisitor)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_status_code() -> u16 {
    200
}

/// A request-matching rule held by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mock {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub method: String,
    pub path: String,
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl Mock {
    /// Short "METHOD path" label used in prompts and captions
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Body of a create or update request: a mock without its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockPayload {
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub delay_ms: u64,
    pub headers: Headers,
    pub body: String,
    pub content_type: Option<String>,
}

/// One request the backend handled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub source: String,
    #[serde(default)]
    pub request_headers: Headers,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub response_headers: Headers,
    #[serde(default)]
    pub response_body: Option<String>,
}

/// Proxy fallback configuration; `None` disables proxying
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub target_url: Option<String>,
}

impl ProxySettings {
    /// Build settings from a text field, treating blank input as "disabled"
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        Self {
            target_url: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }
}

/// Proxy settings plus every mock, in one response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub proxy: ProxySettings,
    #[serde(default)]
    pub mocks: Vec<Mock>,
}

/// Acknowledgement returned by the shutdown endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownAck {
    #[serde(default)]
    pub message: String,
}

/// Operations the console needs from the backend.
///
/// `ApiClient` is the HTTP implementation; tests substitute an in-memory one.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn list_mocks(&self) -> Result<Vec<Mock>, ApiError>;
    async fn create_mock(&self, payload: &MockPayload) -> Result<Mock, ApiError>;
    async fn update_mock(&self, id: &str, payload: &MockPayload) -> Result<Mock, ApiError>;
    async fn delete_mock(&self, id: &str) -> Result<(), ApiError>;
    async fn clear_mocks(&self) -> Result<(), ApiError>;
    async fn list_logs(&self) -> Result<Vec<LogEntry>, ApiError>;
    async fn proxy_settings(&self) -> Result<ProxySettings, ApiError>;
    /// Returns the echoed settings when the backend sends them back
    async fn set_proxy_settings(
        &self,
        settings: &ProxySettings,
    ) -> Result<Option<ProxySettings>, ApiError>;
    async fn server_info(&self) -> Result<ServerInfo, ApiError>;
    async fn shutdown(&self) -> Result<ShutdownAck, ApiError>;
}

/// Path of a single mock, with the identity percent-encoded
pub fn mock_path(id: &str) -> String {
    format!("/mocks/{}", urlencoding::encode(id))
}

/// HTTP client for the mock server API
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a single JSON request.
    ///
    /// Returns `None` for 204 and for empty 2xx bodies.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        self.request_with_headers(method, path, body, HeaderMap::new())
            .await
    }

    /// Like [`ApiClient::request`], merging `extra` over the default
    /// `Content-Type: application/json` header. Caller headers win.
    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        extra: HeaderMap,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Decode(e.to_string()))?;
            builder = builder.body(bytes);
        }

        tracing::debug!(%method, %url, "sending request");
        let resp = builder.send().await?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Self::status_error(status, resp.text().await?));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn status_error(status: StatusCode, body: String) -> ApiError {
        let message = if body.trim().is_empty() {
            format!("Request failed with {}", status.as_u16())
        } else {
            body
        };
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let value = self
            .request(method, path, body)
            .await?
            .ok_or_else(|| ApiError::Decode(format!("empty response from {}", path)))?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn list_mocks(&self) -> Result<Vec<Mock>, ApiError> {
        self.fetch(Method::GET, "/mocks", None).await
    }

    async fn create_mock(&self, payload: &MockPayload) -> Result<Mock, ApiError> {
        let body = Self::encode(payload)?;
        self.fetch(Method::POST, "/mocks", Some(&body)).await
    }

    async fn update_mock(&self, id: &str, payload: &MockPayload) -> Result<Mock, ApiError> {
        let body = Self::encode(payload)?;
        self.fetch(Method::PUT, &mock_path(id), Some(&body)).await
    }

    async fn delete_mock(&self, id: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, &mock_path(id), None).await?;
        Ok(())
    }

    async fn clear_mocks(&self) -> Result<(), ApiError> {
        self.request(Method::DELETE, "/mocks", None).await?;
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.fetch(Method::GET, "/logs", None).await
    }

    async fn proxy_settings(&self) -> Result<ProxySettings, ApiError> {
        self.fetch(Method::GET, "/settings/proxy", None).await
    }

    async fn set_proxy_settings(
        &self,
        settings: &ProxySettings,
    ) -> Result<Option<ProxySettings>, ApiError> {
        let body = Self::encode(settings)?;
        match self
            .request(Method::POST, "/settings/proxy", Some(&body))
            .await?
        {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    async fn server_info(&self) -> Result<ServerInfo, ApiError> {
        self.fetch(Method::GET, "/info", None).await
    }

    async fn shutdown(&self) -> Result<ShutdownAck, ApiError> {
        match self.request(Method::POST, "/server/shutdown", None).await? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_default()),
            None => Ok(ShutdownAck::default()),
        }
    }
}

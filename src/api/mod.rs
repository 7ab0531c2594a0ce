pub mod endpoints;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ApiError;

/// Decoded success body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    pub method: Method,
    pub query: Vec<(&'a str, String)>,
    pub body: Option<serde_json::Value>,
    pub token: Option<&'a str>,
    pub headers: Vec<(&'static str, String)>,
}

impl<'a> RequestOptions<'a> {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    pub fn put<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::PUT,
            body: Some(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn token(mut self, token: Option<&'a str>) -> Self {
        self.token = token;
        self
    }

    pub fn query(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Thin typed wrapper over the service-center REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn headers(opts: &RequestOptions<'_>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &opts.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = name, "dropping invalid request header"),
            }
        }
        if let Some(token) = opts.token.filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("dropping malformed bearer token"),
            }
        }
        headers
    }

    async fn send_once(
        &self,
        url: &str,
        opts: &RequestOptions<'_>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = self
            .client
            .request(opts.method.clone(), url)
            .headers(Self::headers(opts));
        if !opts.query.is_empty() {
            req = req.query(&opts.query);
        }
        if let Some(body) = &opts.body {
            req = req.body(body.to_string());
        }
        req.send().await
    }

    /// Single request. Idempotent GETs get one retry on connect/timeout
    /// failures; nothing else is retried.
    pub async fn request(&self, path: &str, opts: RequestOptions<'_>) -> Result<Payload, ApiError> {
        let url = self.url(path);
        tracing::debug!(method = %opts.method, url = %url, "api request");

        let resp = match self.send_once(&url, &opts).await {
            Ok(resp) => resp,
            Err(e) if opts.method == Method::GET && (e.is_connect() || e.is_timeout()) => {
                tracing::warn!(url = %url, error = %e, "GET failed, retrying once");
                self.send_once(&url, &opts).await?
            }
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::warn!(method = %opts.method, url = %url, status = status.as_u16(), message = %message, "api error");
            return Err(ApiError::Status { status, message });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());

        tracing::debug!(method = %opts.method, url = %url, status = status.as_u16(), "api success");

        if status == StatusCode::NO_CONTENT {
            return Ok(Payload::Empty);
        }
        match content_type {
            Some(ct) if ct.contains("application/json") => {
                let bytes = resp.bytes().await?;
                if bytes.is_empty() {
                    return Ok(Payload::Empty);
                }
                Ok(Payload::Json(serde_json::from_slice(&bytes)?))
            }
            Some(ct) if ct.contains("text/plain") => Ok(Payload::Text(resp.text().await?)),
            _ => Ok(Payload::Empty),
        }
    }

    /// JSON body decoded as `T`; an empty body yields `None`.
    pub async fn json_opt<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: RequestOptions<'_>,
    ) -> Result<Option<T>, ApiError> {
        match self.request(path, opts).await? {
            Payload::Json(serde_json::Value::Null) | Payload::Empty => Ok(None),
            Payload::Json(value) => Ok(Some(serde_json::from_value(value)?)),
            Payload::Text(_) => Err(ApiError::UnexpectedBody { expected: "JSON" }),
        }
    }

    pub async fn json<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        self.json_opt(path, opts)
            .await?
            .ok_or(ApiError::UnexpectedBody { expected: "JSON" })
    }

    pub async fn text(&self, path: &str, opts: RequestOptions<'_>) -> Result<String, ApiError> {
        match self.request(path, opts).await? {
            Payload::Text(text) => Ok(text),
            _ => Err(ApiError::UnexpectedBody { expected: "plain text" }),
        }
    }

    /// Fire a request whose body, if any, is not needed.
    pub async fn send(&self, path: &str, opts: RequestOptions<'_>) -> Result<(), ApiError> {
        self.request(path, opts).await.map(|_| ())
    }
}

/// Prefer the backend's `message`, then `error`, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty());

    from_body
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let body = r#"{"message":"Vehicle not found","error":"Not Found"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "Vehicle not found");
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        let body = r#"{"error":"Slot already booked"}"#;
        assert_eq!(error_message(StatusCode::CONFLICT, body), "Slot already booked");
    }

    #[test]
    fn test_error_message_non_json_uses_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_error_message_unknown_status() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(error_message(status, ""), "Request failed with status 599");
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/auth/login"), "http://localhost:8080/api/auth/login");
        assert_eq!(client.url("auth/login"), "http://localhost:8080/api/auth/login");
    }

    #[test]
    fn test_headers_bearer_only_with_token() {
        let opts = RequestOptions::get();
        let headers = ApiClient::headers(&opts);
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");

        let opts = RequestOptions::get()
            .token(Some("abc"))
            .header("content-type", "text/plain");
        let headers = ApiClient::headers(&opts);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Raw HTTP requests against the project API.
//!
//! [`HttpRequester`] is the seam the client uses for everything that is not a
//! document operation (dataset management, project listing, arbitrary
//! endpoints). [`ReqwestRequester`] is the default implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Result, SanityError};

pub use reqwest::Method;

// ---------------------------------------------------------------------------
// HttpRequest
// ---------------------------------------------------------------------------

/// A request description handed to an [`HttpRequester`].
///
/// When passed to `SanityClient::request`, `uri` is relative to the API base
/// URL; by the time a requester sees it, it is absolute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    /// Encode the body as JSON and parse the response as JSON. `None` defers
    /// to the client's request options.
    pub json: Option<bool>,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }
}

// ---------------------------------------------------------------------------
// HttpRequester
// ---------------------------------------------------------------------------

/// Async trait for the HTTP collaborator.
#[async_trait]
pub trait HttpRequester: Send + Sync {
    /// Perform `request` and return the parsed response body.
    async fn request(&self, request: HttpRequest) -> Result<Value>;
}

// ---------------------------------------------------------------------------
// ReqwestRequester
// ---------------------------------------------------------------------------

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

/// [`HttpRequester`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestRequester {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestRequester {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns [`SanityError::Network`] if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SanityError::Network)?;

        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Turn `request` into a `reqwest::Request` without sending it.
    pub(crate) fn build(&self, request: &HttpRequest) -> Result<reqwest::Request> {
        let url = Url::parse(&request.uri)
            .map_err(|e| SanityError::Validation(format!("Invalid request URI {}: {e}", request.uri)))?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SanityError::Validation(format!("Invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| SanityError::Validation(format!("Invalid value for header {name}: {e}")))?;
            builder = builder.header(header_name, header_value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let json = request.json.unwrap_or(false);
        if json {
            builder = builder.header(ACCEPT, "application/json");
        }
        builder = match (&request.body, json) {
            (Some(body), true) => builder.json(body),
            (Some(Value::String(text)), false) => builder.body(text.clone()),
            (Some(body), false) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?),
            (None, _) => builder,
        };

        builder.build().map_err(SanityError::Network)
    }

    /// Parse a successful response or extract an error from the body.
    async fn handle_response(response: reqwest::Response, json: bool) -> Result<Value> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if status.is_success() => return Err(SanityError::Network(err)),
            Err(_) => String::new(),
        };

        if status.is_success() {
            parse_body(body, json)
        } else {
            Err(error_from_body(status.as_u16(), &body))
        }
    }
}

/// Decode a successful response body. Empty bodies become `null`.
fn parse_body(body: String, json: bool) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    if json {
        serde_json::from_str(&body).map_err(SanityError::Serialization)
    } else {
        Ok(Value::String(body))
    }
}

/// Turn a non-2xx status and its body into the matching [`SanityError`].
///
/// The message comes from the body's `message` field, then `error`, then
/// falls back to `HTTP {status}`.
fn error_from_body(status: u16, body: &str) -> SanityError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorResponse {
            error: Some(error), ..
        }) => error,
        _ => format!("HTTP {status}"),
    };

    match status {
        404 => SanityError::NotFound(message),
        401 | 403 => SanityError::Unauthorized(message),
        _ => SanityError::Server { status, message },
    }
}

#[async_trait]
impl HttpRequester for ReqwestRequester {
    async fn request(&self, request: HttpRequest) -> Result<Value> {
        let built = self.build(&request)?;
        debug!(method = %built.method(), url = %built.url(), "sending request");

        let response = self.http.execute(built).await.map_err(SanityError::Network)?;
        Self::handle_response(response, request.json.unwrap_or(false)).await
    }
}

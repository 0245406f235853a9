// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! The document transport seam.
//!
//! The client never speaks the document wire protocol itself. Queries and
//! mutations are handed to a [`DataTransport`], which is constructed from the
//! client's [`DataEndpoint`] and told about every reconfiguration.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::DataEndpoint;
use crate::error::Result;
use crate::options::RequestOptions;

/// Async trait for the document query/mutation transport.
///
/// Implementations must be `Send + Sync` so one client can be shared across
/// Tokio tasks. Every operation receives the request options built for that
/// call as its final argument; errors are returned to the caller unchanged.
#[async_trait]
pub trait DataTransport: Send + Sync {
    /// Construct a transport for `endpoint`.
    fn connect(endpoint: DataEndpoint) -> Result<Self>
    where
        Self: Sized;

    /// Point an existing transport at a new endpoint.
    fn set_config(&self, endpoint: DataEndpoint) -> Result<()>;

    /// Run a query with bound parameters.
    async fn fetch(&self, query: &str, params: &Value, options: RequestOptions) -> Result<Value>;

    /// Apply a patch to the document `id`.
    async fn update(&self, id: &str, patch: &Value, options: RequestOptions) -> Result<Value>;

    /// Create a document.
    async fn create(&self, document: &Value, options: RequestOptions) -> Result<Value>;

    /// Delete the document `id`.
    async fn delete(&self, id: &str, options: RequestOptions) -> Result<Value>;
}
